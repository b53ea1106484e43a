//! Session context: one identity acting on one ledger.

use crate::error::Error;
use crate::types::{AccountSnapshot, Operation, PublicKey, SubmissionReceipt, TimeBounds};

use super::ledger::Ledger;
use super::signer::{Identity, Signer};
use super::stream::Subscription;

/// The active identity, its ledger and at most one payment subscription.
///
/// [`execute`](Self::execute) keeps a single envelope in flight: every call
/// loads a fresh snapshot, so a sequence number is never reused and a
/// rejected transaction is simply rebuilt on the next call.
#[derive(Debug)]
pub struct Session {
    ledger: Ledger,
    identity: Identity,
    subscription: Option<Subscription>,
}

impl Session {
    /// Start a session for `identity`.
    pub fn new(ledger: Ledger, identity: Identity) -> Self {
        Self {
            ledger,
            identity,
            subscription: None,
        }
    }

    /// The session account.
    pub fn public_key(&self) -> &PublicKey {
        self.identity.public_key()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Load the session account's current state.
    pub async fn refresh(&self) -> Result<AccountSnapshot, Error> {
        self.ledger.load_account(self.public_key()).await
    }

    /// Validate, build, sign and submit `operation` from the session account.
    ///
    /// `validity` of `None` applies the ledger's default timeout. Parameters
    /// are checked before the account is loaded, so invalid input never
    /// touches the network.
    pub async fn execute(
        &self,
        operation: Operation,
        validity: Option<TimeBounds>,
    ) -> Result<SubmissionReceipt, Error> {
        operation.validate()?;

        let snapshot = self.refresh().await?;
        let time_bounds =
            validity.unwrap_or_else(|| TimeBounds::expiring_in(self.ledger.default_timeout()));
        tracing::debug!(
            operation = operation.kind(),
            sequence = snapshot.next_sequence(),
            "executing operation"
        );

        let envelope = self
            .ledger
            .transaction(&snapshot)
            .operation(operation)
            .time_bounds(time_bounds)
            .build()?;
        let signed = self.identity.sign_envelope(envelope)?;
        self.ledger.submit(signed).await
    }

    // ========================================================================
    // Payment subscription
    // ========================================================================

    /// The active subscription, if any.
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Install `subscription`, closing any previous one.
    pub fn set_subscription(&mut self, subscription: Subscription) {
        if let Some(previous) = self.subscription.replace(subscription) {
            previous.close();
        }
    }

    /// Close the active subscription. Does nothing if there is none.
    pub fn close_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }
}
