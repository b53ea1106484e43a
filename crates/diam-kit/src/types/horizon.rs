//! Horizon response types.

use serde::Deserialize;

use super::account::horizon_asset;
use super::{Asset, PublicKey};

/// Successful `POST /transactions` response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Transaction hash (hex).
    pub hash: String,
    /// Ledger the transaction was included in.
    #[serde(default)]
    pub ledger: Option<u64>,
    /// Whether the transaction's operations succeeded.
    #[serde(default = "default_true")]
    pub successful: bool,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Horizon problem document (RFC 7807) returned with error statuses.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct HorizonProblem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub extras: Option<ProblemExtras>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ProblemExtras {
    #[serde(default)]
    pub result_codes: Option<ResultCodes>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ResultCodes {
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub operations: Vec<String>,
}

/// Response of the test-network faucet.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaucetReceipt {
    /// Hash of the funding transaction, when the faucet reports one.
    #[serde(default)]
    pub hash: Option<String>,
    /// Ledger the funding was included in.
    #[serde(default)]
    pub ledger: Option<u64>,
}

/// One record from an account's payment feed.
///
/// The feed carries every operation that moves funds: `payment`,
/// `create_account`, path payments and `account_merge`. Fields that only
/// some types carry are optional.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub source_account: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    /// `create_account` only.
    #[serde(default)]
    pub funder: Option<String>,
    /// `create_account` only.
    #[serde(default)]
    pub account: Option<String>,
    /// `create_account` only.
    #[serde(default)]
    pub starting_balance: Option<String>,
}

impl PaymentRecord {
    /// The asset moved, when the record names one.
    pub fn asset(&self) -> Option<Asset> {
        if self.kind == "create_account" {
            return Some(Asset::Native);
        }
        let issuer = self.asset_issuer.as_deref().and_then(|i| i.parse().ok());
        horizon_asset(self.asset_type.as_deref()?, self.asset_code.as_deref(), issuer)
    }

    /// Sender of the funds.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.funder.as_deref())
    }

    /// Receiver of the funds.
    pub fn receiver(&self) -> Option<&str> {
        self.to.as_deref().or(self.account.as_deref())
    }

    /// Amount moved.
    pub fn moved_amount(&self) -> Option<&str> {
        self.amount.as_deref().or(self.starting_balance.as_deref())
    }
}

/// A route found by path finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentPath {
    /// Asset the sender spends.
    pub source_asset: Asset,
    /// Amount of `source_asset` needed.
    pub source_amount: String,
    /// Asset the receiver gets.
    pub destination_asset: Asset,
    /// Amount the receiver gets.
    pub destination_amount: String,
    /// Intermediate assets, in order.
    pub path: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathsPage {
    #[serde(rename = "_embedded")]
    pub embedded: PathsEmbedded,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathsEmbedded {
    #[serde(default)]
    pub records: Vec<PathRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathRecord {
    pub source_asset_type: String,
    #[serde(default)]
    pub source_asset_code: Option<String>,
    #[serde(default)]
    pub source_asset_issuer: Option<PublicKey>,
    pub source_amount: String,
    pub destination_asset_type: String,
    #[serde(default)]
    pub destination_asset_code: Option<String>,
    #[serde(default)]
    pub destination_asset_issuer: Option<PublicKey>,
    pub destination_amount: String,
    #[serde(default)]
    pub path: Vec<PathAsset>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PathAsset {
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<PublicKey>,
}

impl PathRecord {
    /// Convert, returning `None` if any asset is unrecognized.
    pub(crate) fn into_path(self) -> Option<PaymentPath> {
        let source_asset = horizon_asset(
            &self.source_asset_type,
            self.source_asset_code.as_deref(),
            self.source_asset_issuer,
        )?;
        let destination_asset = horizon_asset(
            &self.destination_asset_type,
            self.destination_asset_code.as_deref(),
            self.destination_asset_issuer,
        )?;
        let path = self
            .path
            .into_iter()
            .map(|a| horizon_asset(&a.asset_type, a.asset_code.as_deref(), a.asset_issuer))
            .collect::<Option<Vec<_>>>()?;

        Some(PaymentPath {
            source_asset,
            source_amount: self.source_amount,
            destination_asset,
            destination_amount: self.destination_amount,
            path,
        })
    }
}
