//! Error types for diam-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) - Main error type, returned by most operations
//!   - [`RpcError`] - Horizon and faucet errors (network, account not found, rejection)
//!   - [`OperationError`] - Operation parameters rejected before any network call
//!   - [`ParseKeyError`] - Malformed `G...` / `S...` keys
//!   - [`ParseAmountError`] - Malformed decimal amounts
//!   - [`SignerError`] - Signing failures
//!   - [`EncodeError`] - XDR encoding failures
//!   - [`StreamError`] - Payment stream transport failures
//!
//! # Error Handling Examples
//!
//! ```rust,no_run
//! use diam_kit::*;
//!
//! # async fn example(account: PublicKey) -> Result<(), Error> {
//! let ledger = Ledger::testnet().build();
//!
//! match ledger.load_account(&account).await {
//!     Ok(snapshot) => println!("Sequence: {}", snapshot.sequence()),
//!     Err(e) if e.is_account_not_found() => println!("{} is not funded yet", account),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use thiserror::Error;

use crate::types::PublicKey;

/// Error parsing a public or secret key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Key is empty")]
    Empty,

    #[error("Invalid key length: expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid key prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix { expected: char, actual: char },

    #[error("Malformed key: invalid characters or checksum")]
    Malformed,

    #[error("Invalid curve point: key bytes do not represent a valid ed25519 point")]
    InvalidCurvePoint,
}

/// Error parsing a decimal amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount '{0}' is negative")]
    Negative(String),

    #[error("Invalid number in amount: '{0}'")]
    InvalidNumber(String),

    #[error("Amount '{0}' has more than 7 decimal places")]
    TooPrecise(String),

    #[error("Amount overflow: '{0}' is too large")]
    Overflow(String),
}

/// Operation parameters rejected by local validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("No operation was added to the transaction")]
    Missing,

    #[error("Asset code is empty")]
    EmptyAssetCode,

    #[error("Invalid asset code '{0}': expected 1-12 ASCII letters or digits")]
    InvalidAssetCode(String),

    #[error("Invalid {field} '{value}': {source}")]
    InvalidKey {
        field: &'static str,
        value: String,
        source: ParseKeyError,
    },

    #[error("Invalid {field}: {source}")]
    InvalidAmount {
        field: &'static str,
        source: ParseAmountError,
    },

    #[error("{field} must be greater than zero")]
    ZeroAmount { field: &'static str },

    #[error("Invalid price '{0}'")]
    InvalidPrice(String),

    #[error("Price must be positive, got '{0}'")]
    NonPositivePrice(String),

    #[error("Price '{0}' cannot be represented as a 32-bit fraction")]
    PriceOutOfRange(String),

    #[error("Invalid offer ID '{0}': expected a non-negative integer")]
    InvalidOfferId(String),

    #[error("A trustline cannot be created for the native asset")]
    NativeTrustline,

    #[error("Selling and buying assets must differ")]
    SameAsset,
}

/// Error during signing operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signer {signer} does not match transaction source {source_account}")]
    SourceMismatch {
        signer: PublicKey,
        source_account: PublicKey,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Error encoding a transaction to XDR.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("XDR encoding failed: {0}")]
pub struct EncodeError(String);

impl From<stellar_xdr::curr::Error> for EncodeError {
    fn from(e: stellar_xdr::curr::Error) -> Self {
        EncodeError(e.to_string())
    }
}

/// Error on a payment stream connection.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Stream HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream rejected with HTTP {status}")]
    Status { status: u16 },

    #[error("Stream transport error: {0}")]
    Transport(String),

    #[error("Stream ended by server")]
    Ended,
}

// ============================================================================
// RPC Errors
// ============================================================================

/// Why the network refused a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// Sequence number is not the account's next sequence.
    BadSequence,
    /// Source cannot cover the amount or the fee.
    InsufficientBalance,
    /// An operation is malformed.
    MalformedOperation,
    /// The time bounds' max time has passed.
    Expired,
    /// The time bounds' min time has not been reached.
    TooEarly,
    /// Fee below the network minimum.
    InsufficientFee,
    /// Missing or wrong signature.
    BadAuth,
    /// Destination account does not exist.
    NoDestination,
    /// Account lacks a trustline for the asset.
    NoTrustline,
    /// Operation would drop the account below its minimum reserve.
    LowReserve,
    /// Any other result code, kept verbatim.
    Other(String),
}

impl RejectionReason {
    /// Map Horizon result codes to a reason.
    ///
    /// Operation codes are more specific than the generic `tx_failed`, so the
    /// first recognized operation code wins.
    pub fn from_result_codes(transaction_code: &str, operation_codes: &[String]) -> Self {
        for code in operation_codes {
            let reason = Self::from_code(code);
            if !matches!(reason, RejectionReason::Other(_)) {
                return reason;
            }
        }
        match Self::from_code(transaction_code) {
            RejectionReason::Other(_) => {
                let code = operation_codes
                    .iter()
                    .find(|c| c.as_str() != "op_success")
                    .map(String::as_str)
                    .unwrap_or(transaction_code);
                RejectionReason::Other(code.to_string())
            }
            reason => reason,
        }
    }

    fn from_code(code: &str) -> Self {
        match code {
            "tx_bad_seq" => RejectionReason::BadSequence,
            "tx_insufficient_balance" | "op_underfunded" => RejectionReason::InsufficientBalance,
            "tx_too_late" => RejectionReason::Expired,
            "tx_too_early" => RejectionReason::TooEarly,
            "op_malformed" | "tx_malformed" | "tx_missing_operation" => {
                RejectionReason::MalformedOperation
            }
            "tx_insufficient_fee" => RejectionReason::InsufficientFee,
            "tx_bad_auth" | "tx_bad_auth_extra" | "op_bad_auth" => RejectionReason::BadAuth,
            "op_no_destination" => RejectionReason::NoDestination,
            "op_no_trust" | "op_src_no_trust" | "op_sell_no_trust" | "op_buy_no_trust" => {
                RejectionReason::NoTrustline
            }
            "op_low_reserve" => RejectionReason::LowReserve,
            other => RejectionReason::Other(other.to_string()),
        }
    }

    /// Returns true if rebuilding from a fresh snapshot may succeed.
    pub fn is_sequence_related(&self) -> bool {
        matches!(self, RejectionReason::BadSequence)
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::BadSequence => f.write_str("bad sequence number"),
            RejectionReason::InsufficientBalance => f.write_str("insufficient balance"),
            RejectionReason::MalformedOperation => f.write_str("malformed operation"),
            RejectionReason::Expired => f.write_str("transaction expired"),
            RejectionReason::TooEarly => f.write_str("transaction not yet valid"),
            RejectionReason::InsufficientFee => f.write_str("insufficient fee"),
            RejectionReason::BadAuth => f.write_str("bad authorization"),
            RejectionReason::NoDestination => f.write_str("destination account does not exist"),
            RejectionReason::NoTrustline => f.write_str("missing trustline"),
            RejectionReason::LowReserve => f.write_str("below minimum reserve"),
            RejectionReason::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Statuses that mean "try again later": 408, 429 and 5xx.
pub(crate) fn is_unavailable_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

/// Horizon and faucet errors.
#[derive(Debug, Error)]
pub enum RpcError {
    // ─── Network/Transport ───
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    #[error("Timeout after {0} retries")]
    Timeout(u32),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ─── Account Errors ───
    #[error("Account not found: {0}")]
    AccountNotFound(PublicKey),

    // ─── Transaction Errors ───
    #[error("Transaction rejected: {reason} ({transaction_code})")]
    SubmissionRejected {
        reason: RejectionReason,
        transaction_code: String,
        operation_codes: Vec<String>,
    },

    // ─── Generic Horizon Error ───
    #[error("Horizon error {status}: {title}")]
    Horizon {
        status: u16,
        title: String,
        detail: Option<String>,
    },
}

impl RpcError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Http(e) => e.is_timeout() || e.is_connect(),
            RpcError::Timeout(_) => true,
            RpcError::Network { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>, status_code: Option<u16>, retryable: bool) -> Self {
        RpcError::Network {
            message: message.into(),
            status_code,
            retryable,
        }
    }

    /// Returns true if the ledger could not be reached.
    ///
    /// Transport failures count, and so do statuses that mean the server is
    /// busy or down (408, 429, 5xx). A definite answer such as a 400 or 404
    /// does not.
    pub fn is_network_unavailable(&self) -> bool {
        match self {
            RpcError::Http(_) | RpcError::Timeout(_) => true,
            RpcError::Network { status_code, .. } => status_code.is_none_or(is_unavailable_status),
            _ => false,
        }
    }

    /// Returns true if this error indicates the account was not found.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, RpcError::AccountNotFound(_))
    }

    /// The rejection reason, if the network refused a submission.
    pub fn rejection_reason(&self) -> Option<&RejectionReason> {
        match self {
            RpcError::SubmissionRejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for diam-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ─── Keys ───
    #[error("Invalid secret key: {0}")]
    InvalidSecretFormat(ParseKeyError),

    // ─── Operations ───
    #[error("Invalid operation parameters: {0}")]
    InvalidOperationParameters(#[from] OperationError),

    // ─── RPC ───
    #[error(transparent)]
    Rpc(#[from] RpcError),

    // ─── Signing ───
    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    // ─── Streaming ───
    #[error(transparent)]
    StreamTransport(#[from] StreamError),
}

impl Error {
    /// Returns true if the account does not exist on the ledger.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, Error::Rpc(e) if e.is_account_not_found())
    }

    /// Returns true if the ledger could not be reached.
    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, Error::Rpc(e) if e.is_network_unavailable())
    }

    /// The rejection reason, if the network refused a submission.
    pub fn rejection_reason(&self) -> Option<&RejectionReason> {
        match self {
            Error::Rpc(e) => e.rejection_reason(),
            _ => None,
        }
    }
}
