//! Ledger operations.
//!
//! [`Operation`] carries parameters exactly as a user typed them (decimal
//! strings, key strings). [`Operation::validate`] turns it into an
//! [`OperationBody`] with typed fields, or rejects it with an
//! [`OperationError`] naming the offending field.

use stellar_xdr::curr as xdr;

use super::{Amount, Asset, AssetCode, Price, PublicKey};
use super::amount::PriceParseError;
use crate::error::OperationError;

/// An asset as entered by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSpec {
    /// The native asset.
    Native,
    /// An issued asset, by code and `G...` issuer.
    Issued { code: String, issuer: String },
}

impl AssetSpec {
    /// An issued asset.
    pub fn issued(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        AssetSpec::Issued {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Validate into an [`Asset`].
    pub fn resolve(&self) -> Result<Asset, OperationError> {
        match self {
            AssetSpec::Native => Ok(Asset::Native),
            AssetSpec::Issued { code, issuer } => {
                let code = AssetCode::new(code)?;
                let issuer = parse_key("issuer", issuer)?;
                Ok(Asset::credit(code, issuer))
            }
        }
    }
}

impl From<&Asset> for AssetSpec {
    fn from(asset: &Asset) -> Self {
        match asset {
            Asset::Native => AssetSpec::Native,
            Asset::Credit { code, issuer } => AssetSpec::issued(code.as_str(), issuer.to_string()),
        }
    }
}

/// An operation request with unvalidated parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Create or update a trustline. `limit` of `None` trusts the maximum.
    ChangeTrust {
        asset: AssetSpec,
        limit: Option<String>,
    },
    /// Send `amount` of `asset` to `destination`.
    Payment {
        destination: String,
        asset: AssetSpec,
        amount: String,
    },
    /// Buy `buy_amount` of `buying`, paying `price` units of `selling` each.
    ///
    /// `offer_id` `"0"` creates a new offer; any other id modifies it.
    ManageBuyOffer {
        selling: AssetSpec,
        buying: AssetSpec,
        buy_amount: String,
        price: String,
        offer_id: String,
    },
    /// Sell `amount` of `selling` at `price` units of `buying` each.
    ///
    /// `offer_id` `"0"` creates a new offer; any other id modifies it.
    ManageSellOffer {
        selling: AssetSpec,
        buying: AssetSpec,
        amount: String,
        price: String,
        offer_id: String,
    },
}

impl Operation {
    /// Trust an issued asset up to the maximum limit.
    pub fn change_trust(asset: AssetSpec) -> Self {
        Operation::ChangeTrust { asset, limit: None }
    }

    /// Pay `amount` of `asset` to `destination`.
    pub fn payment(
        destination: impl Into<String>,
        asset: AssetSpec,
        amount: impl Into<String>,
    ) -> Self {
        Operation::Payment {
            destination: destination.into(),
            asset,
            amount: amount.into(),
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::ChangeTrust { .. } => "change_trust",
            Operation::Payment { .. } => "payment",
            Operation::ManageBuyOffer { .. } => "manage_buy_offer",
            Operation::ManageSellOffer { .. } => "manage_sell_offer",
        }
    }

    /// Check every field and produce the typed operation body.
    pub fn validate(&self) -> Result<OperationBody, OperationError> {
        match self {
            Operation::ChangeTrust { asset, limit } => {
                let asset = asset.resolve()?;
                if asset.is_native() {
                    return Err(OperationError::NativeTrustline);
                }
                let limit = match limit.as_deref() {
                    Some(l) if !l.trim().is_empty() => parse_amount("limit", l)?,
                    _ => Amount::MAX,
                };
                Ok(OperationBody::ChangeTrust { asset, limit })
            }
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                let destination = parse_key("destination", destination)?;
                let asset = asset.resolve()?;
                let amount = parse_positive_amount("amount", amount)?;
                Ok(OperationBody::Payment {
                    destination,
                    asset,
                    amount,
                })
            }
            Operation::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            } => {
                let (selling, buying) = resolve_pair(selling, buying)?;
                Ok(OperationBody::ManageBuyOffer {
                    selling,
                    buying,
                    buy_amount: parse_amount("buy amount", buy_amount)?,
                    price: parse_price(price)?,
                    offer_id: parse_offer_id(offer_id)?,
                })
            }
            Operation::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => {
                let (selling, buying) = resolve_pair(selling, buying)?;
                Ok(OperationBody::ManageSellOffer {
                    selling,
                    buying,
                    amount: parse_amount("amount", amount)?,
                    price: parse_price(price)?,
                    offer_id: parse_offer_id(offer_id)?,
                })
            }
        }
    }
}

/// A validated operation, ready to encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationBody {
    ChangeTrust {
        asset: Asset,
        limit: Amount,
    },
    Payment {
        destination: PublicKey,
        asset: Asset,
        amount: Amount,
    },
    ManageBuyOffer {
        selling: Asset,
        buying: Asset,
        buy_amount: Amount,
        price: Price,
        offer_id: i64,
    },
    ManageSellOffer {
        selling: Asset,
        buying: Asset,
        amount: Amount,
        price: Price,
        offer_id: i64,
    },
}

impl From<&OperationBody> for xdr::OperationBody {
    fn from(body: &OperationBody) -> Self {
        match body {
            OperationBody::ChangeTrust { asset, limit } => {
                xdr::OperationBody::ChangeTrust(xdr::ChangeTrustOp {
                    line: asset.into(),
                    limit: limit.stroops(),
                })
            }
            OperationBody::Payment {
                destination,
                asset,
                amount,
            } => xdr::OperationBody::Payment(xdr::PaymentOp {
                destination: destination.into(),
                asset: asset.into(),
                amount: amount.stroops(),
            }),
            OperationBody::ManageBuyOffer {
                selling,
                buying,
                buy_amount,
                price,
                offer_id,
            } => xdr::OperationBody::ManageBuyOffer(xdr::ManageBuyOfferOp {
                selling: selling.into(),
                buying: buying.into(),
                buy_amount: buy_amount.stroops(),
                price: (*price).into(),
                offer_id: *offer_id,
            }),
            OperationBody::ManageSellOffer {
                selling,
                buying,
                amount,
                price,
                offer_id,
            } => xdr::OperationBody::ManageSellOffer(xdr::ManageSellOfferOp {
                selling: selling.into(),
                buying: buying.into(),
                amount: amount.stroops(),
                price: (*price).into(),
                offer_id: *offer_id,
            }),
        }
    }
}

// ============================================================================
// Field parsers
// ============================================================================

/// Parse a `G...` key for `field`.
pub fn parse_key(field: &'static str, value: &str) -> Result<PublicKey, OperationError> {
    value.parse().map_err(|source| OperationError::InvalidKey {
        field,
        value: value.trim().to_string(),
        source,
    })
}

/// Parse a non-negative decimal amount for `field`.
pub fn parse_amount(field: &'static str, value: &str) -> Result<Amount, OperationError> {
    value
        .parse()
        .map_err(|source| OperationError::InvalidAmount { field, source })
}

/// Parse a strictly positive decimal amount for `field`.
pub fn parse_positive_amount(field: &'static str, value: &str) -> Result<Amount, OperationError> {
    let amount = parse_amount(field, value)?;
    if amount.is_zero() {
        return Err(OperationError::ZeroAmount { field });
    }
    Ok(amount)
}

/// Parse a positive decimal price.
pub fn parse_price(value: &str) -> Result<Price, OperationError> {
    let trimmed = value.trim();
    match Price::parse_decimal(trimmed) {
        Ok(Some(price)) => Ok(price),
        Ok(None) | Err(PriceParseError::Negative) => {
            Err(OperationError::NonPositivePrice(trimmed.to_string()))
        }
        Err(PriceParseError::OutOfRange) => Err(OperationError::PriceOutOfRange(trimmed.to_string())),
        Err(PriceParseError::Invalid) => Err(OperationError::InvalidPrice(trimmed.to_string())),
    }
}

/// Parse an offer id; `0` means a new offer.
pub fn parse_offer_id(value: &str) -> Result<i64, OperationError> {
    let trimmed = value.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| OperationError::InvalidOfferId(trimmed.to_string()))
}

fn resolve_pair(selling: &AssetSpec, buying: &AssetSpec) -> Result<(Asset, Asset), OperationError> {
    let selling = selling.resolve()?;
    let buying = buying.resolve()?;
    if selling == buying {
        return Err(OperationError::SameAsset);
    }
    Ok((selling, buying))
}
