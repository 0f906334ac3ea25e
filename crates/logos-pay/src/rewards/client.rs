//! HTTP client for the rewards backend.

use serde_json::json;
use tracing::warn;

use super::{transaction_from_entry, CashbackSummary, RewardLedgerEntry, RewardTransaction};

const WALLET_HEADER: &str = "X-Wallet-Address";

#[derive(Debug, thiserror::Error)]
pub enum RewardsError {
    #[error("rewards request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("rewards backend returned status {0}")]
    UpstreamStatus(u16),
}

/// Client for the cashback service. Wallet identity travels in a header,
/// not the path, so URLs stay free of addresses.
#[derive(Debug, Clone)]
pub struct RewardsClient {
    http: reqwest::Client,
    base_url: String,
}

impl RewardsClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch_summary(&self, wallet: &str) -> Result<CashbackSummary, RewardsError> {
        let url = format!("{}/cashback/summary", self.base_url);
        let response = self
            .http
            .get(url)
            .header(WALLET_HEADER, wallet)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RewardsError::UpstreamStatus(response.status().as_u16()));
        }

        Ok(response.json::<CashbackSummary>().await?)
    }

    /// Summary with an all-zero fallback when the backend is down.
    pub async fn summary_or_empty(&self, wallet: &str) -> CashbackSummary {
        match self.fetch_summary(wallet).await {
            Ok(summary) => summary,
            Err(error) => {
                warn!(%error, "rewards summary unavailable, serving empty rollup");
                CashbackSummary::empty()
            }
        }
    }

    pub async fn claim(
        &self,
        wallet: &str,
        amount_usd: f64,
    ) -> Result<RewardTransaction, RewardsError> {
        let url = format!("{}/cashback/claim", self.base_url);
        let response = self
            .http
            .post(url)
            .header(WALLET_HEADER, wallet)
            .json(&json!({ "claimed_amount_usd": amount_usd }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RewardsError::UpstreamStatus(response.status().as_u16()));
        }

        let entry = response.json::<RewardLedgerEntry>().await?;
        Ok(transaction_from_entry(&entry))
    }
}
