//! Core ledger types.
//!
//! Keys, amounts, assets, operations and envelopes, plus the Horizon
//! response shapes the client reads.

mod account;
mod amount;
mod asset;
pub(crate) mod horizon;
mod key;
mod network;
mod operation;
mod transaction;

pub(crate) use account::AccountResponse;
pub use account::{AccountSnapshot, Balance};
pub use amount::{Amount, DECIMALS, Price, STROOPS_PER_UNIT};
pub use asset::{Asset, AssetCode};
pub use horizon::{FaucetReceipt, PaymentPath, PaymentRecord, SubmissionReceipt};
pub use key::{PublicKey, SecretKey, Signature};
pub use network::{Network, NetworkId, TESTNET_PASSPHRASE};
pub use operation::{
    AssetSpec, Operation, OperationBody, parse_amount, parse_key, parse_offer_id, parse_positive_amount,
    parse_price,
};
pub use transaction::{SignedEnvelope, TimeBounds, TransactionEnvelope, TransactionHash};
