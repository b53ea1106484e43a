//! Low-level Horizon HTTP client.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{RejectionReason, RpcError, is_unavailable_status};
use crate::types::horizon::{HorizonProblem, PathRecord, PathsPage};
use crate::types::{
    AccountResponse, AccountSnapshot, Amount, Asset, PaymentPath, PublicKey, SignedEnvelope,
    SubmissionReceipt,
};

/// Network configuration presets.
pub struct NetworkConfig {
    /// Horizon base URL.
    pub horizon_url: &'static str,
    /// Faucet URL, for networks that have one.
    pub friendbot_url: Option<&'static str>,
}

/// Diamante testnet configuration.
pub const TESTNET: NetworkConfig = NetworkConfig {
    horizon_url: "https://diamtestnet.diamcircle.io",
    friendbot_url: Some("https://friendbot.diamcircle.io"),
};

/// Retry configuration for idempotent Horizon reads.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retries.
    pub max_retries: u32,
    /// Initial delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry `attempt` (0-based): `initial_delay_ms` doubled
    /// per attempt and capped at `max_delay_ms`.
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        2u64.checked_pow(attempt)
            .and_then(|factor| self.initial_delay_ms.checked_mul(factor))
            .unwrap_or(u64::MAX)
            .min(self.max_delay_ms)
    }
}

/// Low-level Horizon client.
///
/// Reads (`GET`) are retried with exponential backoff on transient failures.
/// Submission is a single attempt: the caller decides whether to rebuild.
#[derive(Clone)]
pub struct HorizonClient {
    url: String,
    client: reqwest::Client,
    retry_config: RetryConfig,
}

impl HorizonClient {
    /// Create a new client with the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_retry_config(url, RetryConfig::default())
    }

    /// Create a new client with custom retry configuration.
    pub fn with_retry_config(url: impl Into<String>, retry_config: RetryConfig) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            retry_config,
        }
    }

    /// Get the base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// `GET /accounts/{id}`.
    pub async fn load_account(&self, account_id: &PublicKey) -> Result<AccountSnapshot, RpcError> {
        let path = format!("/accounts/{}", account_id);
        let response: AccountResponse = match self.get(&path, &[]).await {
            Err(RpcError::Horizon { status: 404, .. }) => {
                return Err(RpcError::AccountNotFound(*account_id));
            }
            other => other?,
        };
        response.into_snapshot().map_err(RpcError::InvalidResponse)
    }

    /// `POST /transactions`. Never retried.
    pub async fn submit_transaction(
        &self,
        signed: &SignedEnvelope,
    ) -> Result<SubmissionReceipt, RpcError> {
        let url = format!("{}/transactions", self.url);
        tracing::debug!(hash = %signed.hash(), "submitting transaction");

        let response = self
            .client
            .post(&url)
            .form(&[("tx", signed.to_base64())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(RpcError::Json);
        }

        match status.as_u16() {
            400 => Err(parse_rejection(&body)),
            504 => Err(RpcError::network(
                "Submission timed out; the transaction may still be included",
                Some(504),
                false,
            )),
            _ => Err(status_error(status, &body, false)),
        }
    }

    /// `GET /paths/strict-receive` for paths from `source_account`'s holdings
    /// ending in `destination_amount` of `destination_asset`, received by
    /// `destination_account`.
    pub async fn strict_receive_paths(
        &self,
        source_account: &PublicKey,
        destination_account: &PublicKey,
        destination_asset: &Asset,
        destination_amount: Amount,
    ) -> Result<Vec<PaymentPath>, RpcError> {
        let mut query = vec![
            ("source_account", source_account.to_string()),
            ("destination_account", destination_account.to_string()),
            ("destination_asset_type", destination_asset.horizon_type().to_string()),
            ("destination_amount", destination_amount.to_string()),
        ];
        if let Asset::Credit { code, issuer } = destination_asset {
            query.push(("destination_asset_code", code.to_string()));
            query.push(("destination_asset_issuer", issuer.to_string()));
        }

        let page: PathsPage = self.get("/paths/strict-receive", &query).await?;
        Ok(page
            .embedded
            .records
            .into_iter()
            .filter_map(PathRecord::into_path)
            .collect())
    }

    /// Make a `GET` request with retries.
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, RpcError> {
        let total_attempts = self.retry_config.max_retries.saturating_add(1);

        for attempt in 0..total_attempts {
            match self.try_get::<R>(path, query).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < total_attempts - 1 => {
                    let delay = self.retry_config.delay_ms(attempt);
                    tracing::debug!(path, attempt, delay_ms = delay, error = %e, "retrying");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(RpcError::Timeout(total_attempts))
    }

    /// Single attempt at a `GET` request.
    async fn try_get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, RpcError> {
        let url = format!("{}{}", self.url, path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body, true));
        }

        serde_json::from_str(&body).map_err(RpcError::Json)
    }
}

impl std::fmt::Debug for HorizonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HorizonClient")
            .field("url", &self.url)
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Classify a non-success response.
///
/// Busy or failing servers become [`RpcError::Network`], retryable when
/// `retry_allowed`. Any other status is a definite answer and becomes
/// [`RpcError::Horizon`] with the problem document's title and detail.
pub(crate) fn status_error(status: StatusCode, body: &str, retry_allowed: bool) -> RpcError {
    let code = status.as_u16();
    let problem = serde_json::from_str::<HorizonProblem>(body).ok();

    if is_unavailable_status(code) {
        let message = match problem {
            Some(HorizonProblem {
                title,
                detail: Some(detail),
                ..
            }) => format!("HTTP {}: {}: {}", status, title, detail),
            Some(problem) => format!("HTTP {}: {}", status, problem.title),
            None => format!("HTTP {}: {}", status, body),
        };
        return RpcError::network(message, Some(code), retry_allowed);
    }

    match problem {
        Some(problem) if !problem.title.is_empty() => RpcError::Horizon {
            status: code,
            title: problem.title,
            detail: problem.detail,
        },
        _ => RpcError::Horizon {
            status: code,
            title: status.canonical_reason().unwrap_or("Unexpected status").to_string(),
            detail: (!body.is_empty()).then(|| body.to_string()),
        },
    }
}

/// Turn a 400 submission response into a typed rejection.
fn parse_rejection(body: &str) -> RpcError {
    let problem = match serde_json::from_str::<HorizonProblem>(body) {
        Ok(problem) => problem,
        Err(_) => {
            return RpcError::Horizon {
                status: 400,
                title: "Bad Request".to_string(),
                detail: Some(body.to_string()),
            };
        }
    };

    match problem.extras.and_then(|e| e.result_codes) {
        Some(codes) => RpcError::SubmissionRejected {
            reason: RejectionReason::from_result_codes(&codes.transaction, &codes.operations),
            transaction_code: codes.transaction,
            operation_codes: codes.operations,
        },
        None => RpcError::Horizon {
            status: 400,
            title: problem.title,
            detail: problem.detail,
        },
    }
}
