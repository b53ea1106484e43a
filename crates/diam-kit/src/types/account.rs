//! Account state snapshots.

use serde::Deserialize;

use super::{Amount, Asset, AssetCode, PublicKey};

/// On-chain account state at the time it was loaded.
///
/// Snapshots are immutable. The sequence number is single-use: each
/// transaction consumes `sequence + 1`, so load a fresh snapshot before
/// building every transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSnapshot {
    account_id: PublicKey,
    sequence: i64,
    balances: Vec<Balance>,
}

impl AccountSnapshot {
    /// Create a snapshot.
    pub fn new(account_id: PublicKey, sequence: i64, balances: Vec<Balance>) -> Self {
        Self {
            account_id,
            sequence,
            balances,
        }
    }

    /// The account this snapshot describes.
    pub fn account_id(&self) -> &PublicKey {
        &self.account_id
    }

    /// Current sequence number, the last one consumed.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Sequence number the next transaction must carry.
    pub fn next_sequence(&self) -> i64 {
        self.sequence + 1
    }

    /// All balances, native first as Horizon reports them.
    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    /// Balance of `asset`, if the account holds it.
    pub fn balance(&self, asset: &Asset) -> Option<Amount> {
        self.balances
            .iter()
            .find(|b| &b.asset == asset)
            .map(|b| b.amount)
    }
}

/// One balance line of an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    /// The asset held.
    pub asset: Asset,
    /// Amount held.
    pub amount: Amount,
    /// Trustline limit; `None` for the native asset.
    pub limit: Option<Amount>,
}

// ============================================================================
// Horizon wire format
// ============================================================================

/// `GET /accounts/{id}` response, the fields this client reads.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountResponse {
    pub account_id: PublicKey,
    pub sequence: String,
    #[serde(default)]
    pub balances: Vec<BalanceResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    pub balance: Amount,
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<PublicKey>,
    #[serde(default)]
    pub limit: Option<Amount>,
}

impl AccountResponse {
    /// Convert into a snapshot. Pool-share balances have no asset and are skipped.
    pub(crate) fn into_snapshot(self) -> Result<AccountSnapshot, String> {
        let sequence = self
            .sequence
            .parse::<i64>()
            .map_err(|_| format!("invalid sequence number '{}'", self.sequence))?;

        let balances = self
            .balances
            .into_iter()
            .filter_map(|b| {
                let asset = horizon_asset(&b.asset_type, b.asset_code.as_deref(), b.asset_issuer)?;
                Some(Balance {
                    asset,
                    amount: b.balance,
                    limit: b.limit,
                })
            })
            .collect();

        Ok(AccountSnapshot::new(self.account_id, sequence, balances))
    }
}

/// Rebuild an [`Asset`] from Horizon's `asset_type` / `asset_code` / `asset_issuer`.
pub(crate) fn horizon_asset(
    asset_type: &str,
    code: Option<&str>,
    issuer: Option<PublicKey>,
) -> Option<Asset> {
    match asset_type {
        "native" => Some(Asset::Native),
        "credit_alphanum4" | "credit_alphanum12" => {
            let code = AssetCode::new(code?).ok()?;
            Some(Asset::credit(code, issuer?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SecretKey;

    #[test]
    fn test_account_response_into_snapshot() {
        let account = SecretKey::from_seed([1u8; 32]).public_key();
        let issuer = SecretKey::from_seed([2u8; 32]).public_key();
        let json = serde_json::json!({
            "id": account.to_string(),
            "account_id": account.to_string(),
            "sequence": "4294967297",
            "subentry_count": 1,
            "balances": [
                {
                    "balance": "12.5000000",
                    "limit": "1000.0000000",
                    "asset_type": "credit_alphanum4",
                    "asset_code": "USD",
                    "asset_issuer": issuer.to_string()
                },
                {
                    "balance": "3.0000000",
                    "asset_type": "liquidity_pool_shares",
                    "liquidity_pool_id": "abcd"
                },
                { "balance": "9999.9999900", "asset_type": "native" }
            ]
        });

        let response: AccountResponse = serde_json::from_value(json).unwrap();
        let snapshot = response.into_snapshot().unwrap();

        assert_eq!(snapshot.account_id(), &account);
        assert_eq!(snapshot.sequence(), 4_294_967_297);
        assert_eq!(snapshot.next_sequence(), 4_294_967_298);
        assert_eq!(snapshot.balances().len(), 2);
        assert_eq!(
            snapshot.balance(&Asset::Native),
            Some(Amount::from_stroops(99_999_999_900))
        );
        let usd = Asset::credit(AssetCode::new("USD").unwrap(), issuer);
        assert_eq!(snapshot.balance(&usd), "12.5".parse().ok());
    }

    #[test]
    fn test_invalid_sequence_rejected() {
        let account = SecretKey::from_seed([1u8; 32]).public_key();
        let response = AccountResponse {
            account_id: account,
            sequence: "not-a-number".to_string(),
            balances: vec![],
        };
        assert!(response.into_snapshot().is_err());
    }
}
