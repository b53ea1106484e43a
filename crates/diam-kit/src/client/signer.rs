//! Signer trait and the in-memory [`Identity`].
//!
//! A `Signer` knows which account it signs for and produces ed25519
//! signatures. Signing is deterministic and performs no I/O.
//!
//! # Example
//!
//! ```rust,no_run
//! use diam_kit::{Identity, Signer};
//!
//! # fn example() -> Result<(), diam_kit::Error> {
//! let identity = Identity::from_secret("SB...")?;
//! println!("Signing for {}", identity.public_key());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::error::{Error, SignerError};
use crate::types::{PublicKey, SecretKey, Signature, SignedEnvelope, TransactionEnvelope};

// ============================================================================
// Signer Trait
// ============================================================================

/// Trait for signing transactions.
pub trait Signer: Send + Sync {
    /// The account this signer signs for.
    fn public_key(&self) -> &PublicKey;

    /// Sign raw bytes.
    fn sign(&self, message: &[u8]) -> Signature;

    /// Sign a transaction envelope.
    ///
    /// Fails if the envelope's source account is not this signer's account,
    /// or if the transaction cannot be encoded.
    fn sign_envelope(&self, envelope: TransactionEnvelope) -> Result<SignedEnvelope, SignerError> {
        let signer = *self.public_key();
        if envelope.source_account() != &signer {
            return Err(SignerError::SourceMismatch {
                signer,
                source_account: *envelope.source_account(),
            });
        }
        let signature = self.sign(envelope.hash()?.as_bytes());
        Ok(envelope.into_signed(&signer, signature)?)
    }
}

/// Implement `Signer` for `Arc<dyn Signer>` for convenience.
impl Signer for Arc<dyn Signer> {
    fn public_key(&self) -> &PublicKey {
        (**self).public_key()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        (**self).sign(message)
    }
}

// ============================================================================
// Identity
// ============================================================================

/// An ed25519 keypair held in memory for the current session.
///
/// The secret is zeroized on drop and never exposed: there is no accessor
/// and `Debug` redacts it.
#[derive(Clone)]
pub struct Identity {
    public_key: PublicKey,
    secret_key: SecretKey,
}

impl Identity {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    /// Load an identity from an `S...` secret seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSecretFormat`] if the seed is malformed.
    pub fn from_secret(secret: impl AsRef<str>) -> Result<Self, Error> {
        let secret_key: SecretKey = secret
            .as_ref()
            .parse()
            .map_err(Error::InvalidSecretFormat)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Wrap an existing secret key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        Self {
            public_key: secret_key.public_key(),
            secret_key,
        }
    }
}

impl Signer for Identity {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(&self, message: &[u8]) -> Signature {
        self.secret_key.sign(message)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &self.public_key)
            .field("secret_key", &"***")
            .finish()
    }
}
