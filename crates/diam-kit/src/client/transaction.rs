//! Transaction builder.
//!
//! Building is pure: the builder reads no clock and makes no network
//! calls. Time bounds are supplied by the caller, typically through
//! [`TimeBounds::expiring_in`].

use crate::error::{Error, OperationError};
use crate::types::{AccountSnapshot, Network, Operation, TimeBounds, TransactionEnvelope};

/// Default base fee in stroops.
pub const BASE_FEE: u32 = 100;

/// Builds a single-operation [`TransactionEnvelope`] from an account snapshot.
///
/// # Example
///
/// ```rust,no_run
/// # use diam_kit::*;
/// # use std::time::Duration;
/// # fn example(snapshot: AccountSnapshot, destination: &str) -> Result<(), Error> {
/// let envelope = TransactionBuilder::new(snapshot, Network::Testnet)
///     .operation(Operation::payment(destination, AssetSpec::Native, "100"))
///     .time_bounds(TimeBounds::expiring_in(Duration::from_secs(30)))
///     .build()?;
/// assert_eq!(envelope.sequence(), envelope.source().sequence() + 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    snapshot: AccountSnapshot,
    network: Network,
    fee: u32,
    time_bounds: Option<TimeBounds>,
    operation: Option<Operation>,
}

impl TransactionBuilder {
    /// Start a transaction from `snapshot` for `network`.
    pub fn new(snapshot: AccountSnapshot, network: Network) -> Self {
        Self {
            snapshot,
            network,
            fee: BASE_FEE,
            time_bounds: None,
            operation: None,
        }
    }

    /// Set the fee in stroops.
    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    /// Set the validity window.
    pub fn time_bounds(mut self, time_bounds: TimeBounds) -> Self {
        self.time_bounds = Some(time_bounds);
        self
    }

    /// Set the operation. A later call replaces an earlier one.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Validate the operation and produce the unsigned envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperationParameters`] if no operation was set
    /// or any of its fields is rejected.
    pub fn build(self) -> Result<TransactionEnvelope, Error> {
        let operation = self.operation.ok_or(OperationError::Missing)?;
        let body = operation.validate()?;

        tracing::debug!(
            source = %self.snapshot.account_id(),
            sequence = self.snapshot.next_sequence(),
            operation = operation.kind(),
            "built transaction"
        );

        Ok(TransactionEnvelope::new(
            self.snapshot,
            self.fee,
            self.network.id(),
            self.time_bounds,
            body,
        ))
    }
}
