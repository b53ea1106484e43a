//! Client module for interacting with a Diamante network.
//!
//! - [`Ledger`] - The main client, the single entry point for all operations
//! - [`LedgerBuilder`] - Fluent builder for configuring the client
//! - [`HorizonClient`] - Low-level Horizon HTTP client with retry logic
//! - [`Faucet`] - Test-network account funding
//!
//! # Signing
//!
//! [`Identity`] holds an ed25519 keypair in memory and implements [`Signer`].
//! Signing consumes a [`TransactionEnvelope`](crate::TransactionEnvelope) and
//! checks that the signer is its source account.
//!
//! # Streaming
//!
//! [`Ledger::stream_payments`] returns a [`PaymentStreamBuilder`]; opening
//! it yields a [`Subscription`] whose [`StreamState`] can be observed and
//! awaited.
//!
//! # Sessions
//!
//! [`Session`] ties one identity to one ledger and runs operations end to
//! end with [`Session::execute`].

mod faucet;
mod horizon;
mod ledger;
mod session;
mod signer;
mod sse;
mod stream;
mod transaction;

pub use faucet::Faucet;
pub use horizon::{HorizonClient, NetworkConfig, RetryConfig, TESTNET};
pub use ledger::{DEFAULT_TIMEOUT, Ledger, LedgerBuilder, NewIdentity};
pub use session::Session;
pub use signer::{Identity, Signer};
pub use stream::{PaymentStreamBuilder, StreamState, Subscription};
pub use transaction::{BASE_FEE, TransactionBuilder};
