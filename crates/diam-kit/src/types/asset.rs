//! Asset references.

use std::fmt;

use stellar_xdr::curr as xdr;

use super::PublicKey;
use crate::error::OperationError;

/// Validated asset code: 1-12 ASCII letters or digits.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetCode(String);

impl AssetCode {
    /// Validate an asset code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, OperationError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(OperationError::EmptyAssetCode);
        }
        if code.len() > 12 || !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(OperationError::InvalidAssetCode(code.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    /// The code as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the code fits the 4-byte encoding.
    pub fn is_alphanum4(&self) -> bool {
        self.0.len() <= 4
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetCode({})", self.0)
    }
}

/// Either the network's native asset or an issued asset.
///
/// Issued assets are equal when both code and issuer match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// The native asset.
    Native,
    /// An asset identified by (code, issuer).
    Credit { code: AssetCode, issuer: PublicKey },
}

impl Asset {
    /// Create an issued asset.
    pub fn credit(code: AssetCode, issuer: PublicKey) -> Self {
        Asset::Credit { code, issuer }
    }

    /// Returns true for the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Horizon's `asset_type` value.
    pub fn horizon_type(&self) -> &'static str {
        match self {
            Asset::Native => "native",
            Asset::Credit { code, .. } if code.is_alphanum4() => "credit_alphanum4",
            Asset::Credit { .. } => "credit_alphanum12",
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => f.write_str("native"),
            Asset::Credit { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

impl From<&Asset> for xdr::Asset {
    fn from(asset: &Asset) -> Self {
        match asset {
            Asset::Native => xdr::Asset::Native,
            Asset::Credit { code, issuer } => {
                let bytes = code.as_str().as_bytes();
                let issuer = xdr::AccountId::from(issuer);
                if code.is_alphanum4() {
                    let mut asset_code = [0u8; 4];
                    asset_code[..bytes.len()].copy_from_slice(bytes);
                    xdr::Asset::CreditAlphanum4(xdr::AlphaNum4 {
                        asset_code: xdr::AssetCode4(asset_code),
                        issuer,
                    })
                } else {
                    let mut asset_code = [0u8; 12];
                    asset_code[..bytes.len()].copy_from_slice(bytes);
                    xdr::Asset::CreditAlphanum12(xdr::AlphaNum12 {
                        asset_code: xdr::AssetCode12(asset_code),
                        issuer,
                    })
                }
            }
        }
    }
}

impl From<&Asset> for xdr::ChangeTrustAsset {
    fn from(asset: &Asset) -> Self {
        match xdr::Asset::from(asset) {
            xdr::Asset::Native => xdr::ChangeTrustAsset::Native,
            xdr::Asset::CreditAlphanum4(a) => xdr::ChangeTrustAsset::CreditAlphanum4(a),
            xdr::Asset::CreditAlphanum12(a) => xdr::ChangeTrustAsset::CreditAlphanum12(a),
        }
    }
}
