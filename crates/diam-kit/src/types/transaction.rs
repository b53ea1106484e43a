//! Transaction envelopes.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{self as xdr, Limits, WriteXdr};

use super::{AccountSnapshot, NetworkId, OperationBody, PublicKey, Signature};
use crate::error::EncodeError;

/// Validity window in UNIX seconds. A `max_time` of 0 means no upper bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeBounds {
    pub min_time: u64,
    pub max_time: u64,
}

impl TimeBounds {
    /// A window from `min_time` to `max_time`.
    pub fn new(min_time: u64, max_time: u64) -> Self {
        Self { min_time, max_time }
    }

    /// Valid from now until `timeout` has elapsed.
    pub fn expiring_in(timeout: Duration) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            min_time: 0,
            max_time: now.saturating_add(timeout.as_secs()),
        }
    }
}

/// Transaction hash, the SHA-256 of the signature base.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHash([u8; 32]);

impl TransactionHash {
    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({})", self)
    }
}

/// An unsigned single-operation transaction.
///
/// Built by [`TransactionBuilder`](crate::TransactionBuilder) from an
/// [`AccountSnapshot`]; the envelope carries the snapshot's next sequence
/// number. Signing consumes the envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionEnvelope {
    source: AccountSnapshot,
    sequence: i64,
    fee: u32,
    network_id: NetworkId,
    time_bounds: Option<TimeBounds>,
    operation: OperationBody,
}

impl TransactionEnvelope {
    pub(crate) fn new(
        source: AccountSnapshot,
        fee: u32,
        network_id: NetworkId,
        time_bounds: Option<TimeBounds>,
        operation: OperationBody,
    ) -> Self {
        let sequence = source.next_sequence();
        Self {
            source,
            sequence,
            fee,
            network_id,
            time_bounds,
            operation,
        }
    }

    /// The snapshot this envelope was built from.
    pub fn source(&self) -> &AccountSnapshot {
        &self.source
    }

    /// The source account.
    pub fn source_account(&self) -> &PublicKey {
        self.source.account_id()
    }

    /// Sequence number consumed by this transaction.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Fee in stroops.
    pub fn fee(&self) -> u32 {
        self.fee
    }

    /// Network this envelope is scoped to.
    pub fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    /// Validity window, if any.
    pub fn time_bounds(&self) -> Option<TimeBounds> {
        self.time_bounds
    }

    /// The operation.
    pub fn operation(&self) -> &OperationBody {
        &self.operation
    }

    /// XDR encoding of the `Transaction` structure.
    pub fn to_xdr(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.to_xdr_transaction()?.to_xdr(Limits::none())?)
    }

    /// Hash that gets signed: `sha256(network_id || ENVELOPE_TYPE_TX || tx)`.
    pub fn hash(&self) -> Result<TransactionHash, EncodeError> {
        let payload = xdr::TransactionSignaturePayload {
            network_id: xdr::Hash(*self.network_id.as_bytes()),
            tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction::Tx(
                self.to_xdr_transaction()?,
            ),
        };
        let bytes = payload.to_xdr(Limits::none())?;
        Ok(TransactionHash(Sha256::digest(bytes).into()))
    }

    /// Attach a signature produced over [`hash`](Self::hash) and encode the
    /// resulting `TransactionEnvelope`.
    pub(crate) fn into_signed(
        self,
        signer: &PublicKey,
        signature: Signature,
    ) -> Result<SignedEnvelope, EncodeError> {
        let hash = self.hash()?;
        let decorated = xdr::DecoratedSignature {
            hint: xdr::SignatureHint(signer.hint()),
            signature: xdr::Signature(signature.as_bytes().to_vec().try_into()?),
        };
        let envelope = xdr::TransactionEnvelope::Tx(xdr::TransactionV1Envelope {
            tx: self.to_xdr_transaction()?,
            signatures: vec![decorated].try_into()?,
        });
        let bytes = envelope.to_xdr(Limits::none())?;

        Ok(SignedEnvelope {
            envelope: self,
            signature,
            hash,
            xdr: bytes,
        })
    }

    /// One operation, no memo, no per-operation source account.
    fn to_xdr_transaction(&self) -> Result<xdr::Transaction, EncodeError> {
        let cond = match self.time_bounds {
            Some(bounds) => xdr::Preconditions::Time(xdr::TimeBounds {
                min_time: xdr::TimePoint(bounds.min_time),
                max_time: xdr::TimePoint(bounds.max_time),
            }),
            None => xdr::Preconditions::None,
        };
        let operation = xdr::Operation {
            source_account: None,
            body: (&self.operation).into(),
        };

        Ok(xdr::Transaction {
            source_account: self.source.account_id().into(),
            fee: self.fee,
            seq_num: xdr::SequenceNumber(self.sequence),
            cond,
            memo: xdr::Memo::None,
            operations: vec![operation].try_into()?,
            ext: xdr::TransactionExt::V0,
        })
    }
}

/// A signed envelope ready for submission.
///
/// Not `Clone`: submitting takes it by value, so one envelope is submitted once.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedEnvelope {
    envelope: TransactionEnvelope,
    signature: Signature,
    hash: TransactionHash,
    xdr: Vec<u8>,
}

impl SignedEnvelope {
    /// The unsigned envelope.
    pub fn envelope(&self) -> &TransactionEnvelope {
        &self.envelope
    }

    /// The signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Transaction hash.
    pub fn hash(&self) -> TransactionHash {
        self.hash
    }

    /// XDR `TransactionEnvelope` bytes.
    pub fn to_xdr(&self) -> &[u8] {
        &self.xdr
    }

    /// Base64 XDR, the form Horizon accepts.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.xdr)
    }
}
