//! A Rust client for the Diamante network.
//!
//! **diam-kit** loads accounts, builds and signs single-operation
//! transactions, submits them to Horizon and follows an account's payments
//! over server-sent events.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use diam_kit::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), diam_kit::Error> {
//!     let ledger = Ledger::testnet().build();
//!
//!     // New funded identity
//!     let created = ledger.create_identity().await;
//!     let session = Session::new(ledger, created.identity);
//!
//!     // Pay 100 units of the native asset to ourselves
//!     let me = session.public_key().to_string();
//!     let receipt = session
//!         .execute(Operation::payment(me, AssetSpec::Native, "100"), None)
//!         .await?;
//!     println!("Included in ledger {:?}", receipt.ledger);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Design Principles
//!
//! 1. **Single entry point**: everything hangs off [`Ledger`]
//! 2. **Validate first**: operation parameters are checked before any network call
//! 3. **One snapshot, one envelope**: a sequence number is consumed exactly once
//! 4. **Exact amounts**: decimal strings parse to integer stroops, never floats
//!
//! # Core Types
//!
//! - [`PublicKey`], [`SecretKey`] - ed25519 keys in `G...` / `S...` form
//! - [`Amount`] - Seven-decimal fixed-point amount
//! - [`Asset`] - Native or issued asset
//! - [`Operation`] - User-supplied operation parameters
//! - [`TransactionEnvelope`], [`SignedEnvelope`] - Unsigned and signed transactions
//!
//! # String Parsing
//!
//! ```
//! use diam_kit::{Amount, PublicKey, SecretKey};
//!
//! let amount: Amount = "12.5".parse().unwrap();
//! assert_eq!(amount.stroops(), 125_000_000);
//!
//! let key = SecretKey::generate().public_key();
//! let parsed: PublicKey = key.to_string().parse().unwrap();
//! assert_eq!(parsed, key);
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    EncodeError, Error, OperationError, ParseAmountError, ParseKeyError, RejectionReason,
    RpcError, SignerError, StreamError,
};
pub use types::*;

// Re-export client types
pub use client::{
    BASE_FEE, DEFAULT_TIMEOUT, Faucet, HorizonClient, Identity, Ledger, LedgerBuilder,
    NetworkConfig, NewIdentity, PaymentStreamBuilder, RetryConfig, Session, Signer, StreamState,
    Subscription, TESTNET, TransactionBuilder,
};
