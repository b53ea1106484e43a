//! The main Ledger client.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::types::{
    AccountSnapshot, AssetSpec, FaucetReceipt, Network, PaymentPath, PublicKey, SignedEnvelope,
    SubmissionReceipt, parse_positive_amount,
};

use super::faucet::Faucet;
use super::horizon::{HorizonClient, RetryConfig, TESTNET};
use super::signer::{Identity, Signer};
use super::stream::PaymentStreamBuilder;
use super::transaction::{BASE_FEE, TransactionBuilder};

/// Validity window used when the caller does not choose one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// The main client for a Diamante network.
///
/// `Ledger` owns the Horizon connection, the optional faucet and the
/// network parameters every envelope is built with. It is cheap to clone.
///
/// # Example
///
/// ```rust,no_run
/// use diam_kit::*;
///
/// # async fn example() -> Result<(), diam_kit::Error> {
/// let ledger = Ledger::testnet().build();
///
/// let created = ledger.create_identity().await;
/// if let Err(e) = &created.funding {
///     println!("Funding failed: {}", e);
/// }
///
/// let snapshot = ledger.load_account(created.identity.public_key()).await?;
/// println!("Sequence: {}", snapshot.sequence());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Ledger {
    horizon: Arc<HorizonClient>,
    faucet: Option<Faucet>,
    network: Network,
    base_fee: u32,
    default_timeout: Duration,
}

/// A freshly generated identity and the outcome of funding it.
#[derive(Debug)]
pub struct NewIdentity {
    /// The generated keypair.
    pub identity: Identity,
    /// Faucet result. A failure here does not invalidate the identity.
    pub funding: Result<FaucetReceipt, Error>,
}

impl Ledger {
    /// Create a builder for the Diamante testnet.
    pub fn testnet() -> LedgerBuilder {
        let mut builder = LedgerBuilder::new(TESTNET.horizon_url, Network::Testnet);
        builder.friendbot_url = TESTNET.friendbot_url.map(str::to_string);
        builder
    }

    /// Create a builder with a custom Horizon URL.
    ///
    /// No faucet is configured and the testnet passphrase is used unless
    /// overridden with [`LedgerBuilder::network`].
    pub fn custom(horizon_url: impl Into<String>) -> LedgerBuilder {
        LedgerBuilder::new(horizon_url, Network::Testnet)
    }

    /// The underlying Horizon client.
    pub fn horizon(&self) -> &HorizonClient {
        &self.horizon
    }

    /// The network envelopes are signed for.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Fee per transaction, in stroops.
    pub fn base_fee(&self) -> u32 {
        self.base_fee
    }

    /// Validity window applied when none is given.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// The faucet, if one is configured.
    pub fn faucet(&self) -> Option<&Faucet> {
        self.faucet.as_ref()
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Load the current state of `account`.
    ///
    /// # Errors
    ///
    /// [`Error::is_account_not_found`] is true if the account does not exist,
    /// [`Error::is_network_unavailable`] if Horizon could not be reached.
    pub async fn load_account(&self, account: &PublicKey) -> Result<AccountSnapshot, Error> {
        Ok(self.horizon.load_account(account).await?)
    }

    /// Ask the faucet to fund `account`.
    pub async fn fund(&self, account: &PublicKey) -> Result<FaucetReceipt, Error> {
        let faucet = self
            .faucet
            .as_ref()
            .ok_or_else(|| Error::Config("no faucet configured for this network".to_string()))?;
        Ok(faucet.fund(account).await?)
    }

    /// Generate a new identity and request faucet funding for it.
    ///
    /// Never fails: a funding failure is logged and reported in
    /// [`NewIdentity::funding`].
    pub async fn create_identity(&self) -> NewIdentity {
        let identity = Identity::generate();
        let account = *identity.public_key();
        let funding = self.fund(&account).await;

        match &funding {
            Ok(_) => tracing::info!(%account, "funded new account"),
            Err(e) => tracing::warn!(%account, error = %e, "faucet funding failed"),
        }

        NewIdentity { identity, funding }
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Start a transaction from `snapshot` with this ledger's fee and network.
    pub fn transaction(&self, snapshot: &AccountSnapshot) -> TransactionBuilder {
        TransactionBuilder::new(snapshot.clone(), self.network.clone()).fee(self.base_fee)
    }

    /// Submit a signed envelope once.
    ///
    /// # Errors
    ///
    /// [`Error::rejection_reason`] is set when the network refused the
    /// transaction.
    pub async fn submit(&self, signed: SignedEnvelope) -> Result<SubmissionReceipt, Error> {
        let hash = signed.hash();
        let receipt = self.horizon.submit_transaction(&signed).await?;
        tracing::info!(%hash, ledger = ?receipt.ledger, "transaction accepted");
        Ok(receipt)
    }

    // ========================================================================
    // Streams and paths
    // ========================================================================

    /// Configure a payment stream for `account`.
    pub fn stream_payments(&self, account: &PublicKey) -> PaymentStreamBuilder {
        PaymentStreamBuilder::new(self.horizon.http().clone(), self.horizon.url(), *account)
    }

    /// Find strict-receive paths from `source`'s holdings to `amount` of `destination`.
    ///
    /// `source` is also the receiving account. Parameters are validated
    /// before any request is made.
    pub async fn find_paths(
        &self,
        source: &PublicKey,
        destination: AssetSpec,
        amount: &str,
    ) -> Result<Vec<PaymentPath>, Error> {
        let asset = destination.resolve()?;
        let amount = parse_positive_amount("destination amount", amount)?;
        Ok(self
            .horizon
            .strict_receive_paths(source, source, &asset, amount)
            .await?)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("horizon", &self.horizon)
            .field("network", &self.network)
            .field("base_fee", &self.base_fee)
            .finish()
    }
}

/// Builder for creating a [`Ledger`].
///
/// ```rust,no_run
/// use std::time::Duration;
/// use diam_kit::*;
///
/// let ledger = Ledger::custom("http://localhost:8000")
///     .network(Network::custom("Standalone Network ; February 2017"))
///     .friendbot("http://localhost:8000/friendbot")
///     .base_fee(200)
///     .default_timeout(Duration::from_secs(60))
///     .retry_config(RetryConfig::none())
///     .build();
/// ```
pub struct LedgerBuilder {
    horizon_url: String,
    friendbot_url: Option<String>,
    network: Network,
    base_fee: u32,
    default_timeout: Duration,
    retry_config: RetryConfig,
}

impl LedgerBuilder {
    fn new(horizon_url: impl Into<String>, network: Network) -> Self {
        Self {
            horizon_url: horizon_url.into(),
            friendbot_url: None,
            network,
            base_fee: BASE_FEE,
            default_timeout: DEFAULT_TIMEOUT,
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the network passphrase.
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// Use the faucet at `url`.
    pub fn friendbot(mut self, url: impl Into<String>) -> Self {
        self.friendbot_url = Some(url.into());
        self
    }

    /// Disable the faucet.
    pub fn without_friendbot(mut self) -> Self {
        self.friendbot_url = None;
        self
    }

    /// Set the fee per transaction in stroops.
    pub fn base_fee(mut self, fee: u32) -> Self {
        self.base_fee = fee;
        self
    }

    /// Set the default validity window.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the retry configuration for reads.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Ledger {
        let horizon = HorizonClient::with_retry_config(self.horizon_url, self.retry_config);
        let faucet = self
            .friendbot_url
            .map(|url| Faucet::with_client(url, horizon.http().clone()));
        Ledger {
            horizon: Arc::new(horizon),
            faucet,
            network: self.network,
            base_fee: self.base_fee,
            default_timeout: self.default_timeout,
        }
    }
}

impl From<LedgerBuilder> for Ledger {
    fn from(builder: LedgerBuilder) -> Self {
        builder.build()
    }
}
