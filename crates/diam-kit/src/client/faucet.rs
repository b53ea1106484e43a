//! Test-network faucet ("friendbot").

use super::horizon::status_error;
use crate::error::RpcError;
use crate::types::{FaucetReceipt, PublicKey};

/// Client for a faucet that funds new test accounts.
#[derive(Clone, Debug)]
pub struct Faucet {
    url: String,
    client: reqwest::Client,
}

impl Faucet {
    /// Create a faucet client for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub(crate) fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Faucet URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request funding: `GET {url}?addr={account}`.
    pub async fn fund(&self, account: &PublicKey) -> Result<FaucetReceipt, RpcError> {
        tracing::debug!(%account, url = %self.url, "requesting faucet funding");

        let response = self
            .client
            .get(&self.url)
            .query(&[("addr", account.to_string())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = status_error(status, &body, false);
            tracing::debug!(%account, error = %err, "faucet refused funding");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(RpcError::Json)
    }
}
