//! Ed25519 key types with StrKey text encoding.
//!
//! The `G...` and `S...` codec is `stellar-strkey`; this module adds the
//! length and prefix checks that give readable errors, curve point
//! validation, and redaction of secrets.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stellar_strkey::ed25519;
use stellar_xdr::curr as xdr;
use zeroize::{Zeroize, Zeroizing};

use crate::error::ParseKeyError;

/// Length of an encoded key.
const ENCODED_LEN: usize = 56;

/// Check what `stellar-strkey` reports only as "invalid".
fn precheck(s: &str, prefix: char) -> Result<(), ParseKeyError> {
    let Some(first) = s.chars().next() else {
        return Err(ParseKeyError::Empty);
    };
    let actual = s.chars().count();
    if actual != ENCODED_LEN {
        return Err(ParseKeyError::InvalidLength {
            expected: ENCODED_LEN,
            actual,
        });
    }
    if first != prefix {
        return Err(ParseKeyError::InvalidPrefix {
            expected: prefix,
            actual: first,
        });
    }
    Ok(())
}

/// Ed25519 public key, displayed as a `G...` account id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Create a public key from raw bytes, validating the curve point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, ParseKeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| ParseKeyError::InvalidCurvePoint)?;
        Ok(Self(bytes))
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Signature hint: the last four bytes of the key.
    pub fn hint(&self) -> [u8; 4] {
        [self.0[28], self.0[29], self.0[30], self.0[31]]
    }
}

impl FromStr for PublicKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        precheck(s, 'G')?;
        let key: ed25519::PublicKey = s.parse().map_err(|_| ParseKeyError::Malformed)?;
        Self::from_bytes(key.0)
    }
}

impl TryFrom<&str> for PublicKey {
    type Error = ParseKeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ed25519::PublicKey(self.0).to_string())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl From<&PublicKey> for xdr::AccountId {
    fn from(key: &PublicKey) -> Self {
        xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(key.0)))
    }
}

impl From<&PublicKey> for xdr::MuxedAccount {
    fn from(key: &PublicKey) -> Self {
        xdr::MuxedAccount::Ed25519(xdr::Uint256(key.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ed25519 secret seed, parsed from an `S...` string.
///
/// The seed is wiped from memory on drop. There is no `Display`
/// implementation and `Debug` never prints key material.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<[u8; 32]>);

impl SecretKey {
    /// Generate a new random secret key.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self(Zeroizing::new(signing_key.to_bytes()))
    }

    /// Create a secret key from a raw 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(Zeroizing::new(seed))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        let signing_key = SigningKey::from_bytes(&self.0);
        PublicKey(signing_key.verifying_key().to_bytes())
    }

    /// Sign a message. Ed25519 signatures are deterministic.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let signing_key = SigningKey::from_bytes(&self.0);
        Signature(signing_key.sign(message).to_bytes())
    }
}

impl FromStr for SecretKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        precheck(s, 'S')?;
        let mut key: ed25519::PrivateKey = s.parse().map_err(|_| ParseKeyError::Malformed)?;
        let seed = Zeroizing::new(key.0);
        key.0.zeroize();
        Ok(Self(seed))
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.public_key() == other.public_key()
    }
}

impl Eq for SecretKey {}

/// Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Verify this signature against a message and public key.
    pub fn verify(&self, message: &[u8], public_key: &PublicKey) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&self.0);
        verifying_key.verify(message, &signature).is_ok()
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_sign() {
        let secret = SecretKey::generate();
        let public = secret.public_key();
        let message = b"hello ledger";

        let signature = secret.sign(message);
        assert!(signature.verify(message, &public));
        assert!(!signature.verify(b"wrong message", &public));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let secret = SecretKey::from_seed([42u8; 32]);
        assert_eq!(secret.sign(b"payload"), secret.sign(b"payload"));
    }

    #[test]
    fn test_public_key_roundtrip() {
        let public = SecretKey::generate().public_key();
        let s = public.to_string();
        assert!(s.starts_with('G'));
        assert_eq!(s.len(), 56);
        let parsed: PublicKey = s.parse().unwrap();
        assert_eq!(public, parsed);
    }

    #[test]
    fn test_secret_key_parses_seed() {
        let seed = [5u8; 32];
        let encoded = ed25519::PrivateKey(seed).to_string();
        let parsed: SecretKey = encoded.parse().unwrap();
        assert_eq!(parsed, SecretKey::from_seed(seed));
    }

    #[test]
    fn test_secret_key_rejects_account_id() {
        let public = SecretKey::generate().public_key().to_string();
        let err = public.parse::<SecretKey>().unwrap_err();
        assert!(matches!(err, ParseKeyError::InvalidPrefix { .. }));
    }

    #[test]
    fn test_parse_errors_are_specific() {
        assert_eq!("".parse::<PublicKey>(), Err(ParseKeyError::Empty));
        assert_eq!(
            "GABC".parse::<PublicKey>(),
            Err(ParseKeyError::InvalidLength {
                expected: 56,
                actual: 4
            })
        );

        let mut account = SecretKey::from_seed([6u8; 32]).public_key().to_string();
        // Flip the last character so the checksum no longer matches.
        let last = account.pop().unwrap();
        account.push(if last == 'A' { 'B' } else { 'A' });
        assert_eq!(account.parse::<PublicKey>(), Err(ParseKeyError::Malformed));

        let lowercase = SecretKey::from_seed([6u8; 32]).public_key().to_string().to_lowercase();
        assert!(matches!(
            lowercase.parse::<PublicKey>(),
            Err(ParseKeyError::InvalidPrefix { expected: 'G', actual: 'g' })
        ));
    }

    #[test]
    fn test_strkey_matches_known_vector() {
        // All-zero key, the well-known "GAAA...WHF" account.
        let zero = ed25519::PublicKey([0u8; 32]).to_string();
        assert_eq!(zero, "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF");
        let seed = SecretKey::from_seed([7u8; 32]);
        let encoded = ed25519::PrivateKey([7u8; 32]).to_string();
        assert_eq!(encoded, "SADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQP54X");
        assert_eq!(encoded.parse::<SecretKey>().unwrap(), seed);
    }

    #[test]
    fn test_xdr_account_conversions() {
        let public = SecretKey::from_seed([9u8; 32]).public_key();
        assert_eq!(
            xdr::AccountId::from(&public),
            xdr::AccountId(xdr::PublicKey::PublicKeyTypeEd25519(xdr::Uint256(*public.as_bytes())))
        );
        assert_eq!(
            xdr::MuxedAccount::from(&public),
            xdr::MuxedAccount::Ed25519(xdr::Uint256(*public.as_bytes()))
        );
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let seed = [1u8; 32];
        let encoded = ed25519::PrivateKey(seed).to_string();
        let secret: SecretKey = encoded.parse().unwrap();
        let debug = format!("{:?}", secret);
        assert_eq!(debug, "SecretKey(***)");
        assert!(!debug.contains(&encoded));
    }

    #[test]
    fn test_hint_is_last_four_bytes() {
        let public = SecretKey::from_seed([9u8; 32]).public_key();
        assert_eq!(&public.hint()[..], &public.as_bytes()[28..]);
    }

    #[test]
    fn test_public_key_serde() {
        let public = SecretKey::generate().public_key();
        let json = serde_json::to_string(&public).unwrap();
        assert_eq!(json, format!("\"{}\"", public));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, public);
    }
}
