//! Fixed-point amounts and offer prices.
//!
//! Ledger amounts are signed 64-bit integers counting stroops, with seven
//! implied decimal places. Parsing is exact: `"100.5"` is `1_005_000_000`
//! stroops, never a float.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseAmountError;

/// Number of decimal places in a ledger amount.
pub const DECIMALS: u32 = 7;

/// Stroops per whole unit.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// A non-negative ledger amount in stroops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero.
    pub const ZERO: Amount = Amount(0);

    /// Largest representable amount, the default trustline limit.
    pub const MAX: Amount = Amount(i64::MAX);

    /// Create from a raw stroop count.
    pub const fn from_stroops(stroops: i64) -> Self {
        Self(stroops)
    }

    /// Create from whole units.
    pub fn from_units(units: i64) -> Option<Self> {
        units.checked_mul(STROOPS_PER_UNIT).map(Self)
    }

    /// Raw stroop count.
    pub fn stroops(&self) -> i64 {
        self.0
    }

    /// Returns true if this amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, scaled) = parse_decimal(s, DECIMALS)?;
        let stroops = whole
            .checked_mul(STROOPS_PER_UNIT as u64)
            .and_then(|v| v.checked_add(scaled))
            .filter(|v| *v <= i64::MAX as u64)
            .ok_or_else(|| ParseAmountError::Overflow(s.to_string()))?;
        Ok(Self(stroops as i64))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let stroops = self.0.unsigned_abs();
        let per_unit = STROOPS_PER_UNIT as u64;
        write!(f, "{}{}.{:07}", sign, stroops / per_unit, stroops % per_unit)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an unsigned decimal into (integer part, fraction scaled to `places`).
fn parse_decimal(s: &str, places: u32) -> Result<(u64, u64), ParseAmountError> {
    if s.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(ParseAmountError::Negative(s.to_string()));
    }

    let (integer_part, fraction_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if (integer_part.is_empty() && fraction_part.is_empty())
        || !all_digits(integer_part)
        || !all_digits(fraction_part)
    {
        return Err(ParseAmountError::InvalidNumber(s.to_string()));
    }
    if fraction_part.len() > places as usize {
        return Err(ParseAmountError::TooPrecise(s.to_string()));
    }

    let whole: u64 = if integer_part.is_empty() {
        0
    } else {
        integer_part
            .parse()
            .map_err(|_| ParseAmountError::Overflow(s.to_string()))?
    };

    let scaled: u64 = if fraction_part.is_empty() {
        0
    } else {
        let digits: u64 = fraction_part
            .parse()
            .map_err(|_| ParseAmountError::InvalidNumber(s.to_string()))?;
        digits * 10u64.pow(places - fraction_part.len() as u32)
    };

    Ok((whole, scaled))
}

/// Offer price as the fraction `n / d` of two positive 32-bit integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Price {
    n: i32,
    d: i32,
}

impl Price {
    /// Create a price, returning `None` unless both terms are positive.
    pub fn new(n: i32, d: i32) -> Option<Self> {
        (n > 0 && d > 0).then_some(Self { n, d })
    }

    /// Numerator.
    pub fn numerator(&self) -> i32 {
        self.n
    }

    /// Denominator.
    pub fn denominator(&self) -> i32 {
        self.d
    }

    /// Parse a positive decimal such as `"1.25"` into a reduced fraction.
    ///
    /// Returns `Ok(None)` for zero so callers can report it distinctly.
    pub(crate) fn parse_decimal(s: &str) -> Result<Option<Self>, PriceParseError> {
        let s = s.trim();
        let places = s
            .split_once('.')
            .map(|(_, f)| f.len() as u32)
            .unwrap_or(0);
        if places > 9 {
            return Err(PriceParseError::OutOfRange);
        }
        let (whole, scaled) = parse_decimal(s, places).map_err(|e| match e {
            ParseAmountError::Negative(_) => PriceParseError::Negative,
            ParseAmountError::Overflow(_) => PriceParseError::OutOfRange,
            _ => PriceParseError::Invalid,
        })?;

        let denominator = 10u64.pow(places);
        let numerator = whole
            .checked_mul(denominator)
            .and_then(|v| v.checked_add(scaled))
            .ok_or(PriceParseError::OutOfRange)?;
        if numerator == 0 {
            return Ok(None);
        }

        let divisor = gcd(numerator, denominator);
        let (n, d) = (numerator / divisor, denominator / divisor);
        match (i32::try_from(n), i32::try_from(d)) {
            (Ok(n), Ok(d)) => Ok(Some(Self { n, d })),
            _ => Err(PriceParseError::OutOfRange),
        }
    }
}

impl From<Price> for stellar_xdr::curr::Price {
    fn from(price: Price) -> Self {
        stellar_xdr::curr::Price {
            n: price.n,
            d: price.d,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PriceParseError {
    Invalid,
    Negative,
    OutOfRange,
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
