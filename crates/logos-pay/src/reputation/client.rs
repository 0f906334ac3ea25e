use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::EthosConfig;

/// Client for the Ethos reputation graph. Lookups are by wallet address and
/// carry the partner identification header the graph requires.
pub struct EthosClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
}

/// Score attached to an address at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationSnapshot {
    pub score: i64,
    pub source: &'static str,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReputationError {
    #[error("address not present in the reputation graph")]
    UnknownAddress,
    #[error("reputation graph request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("reputation graph answered with status {0}")]
    UpstreamStatus(u16),
    #[error("reputation payload carried no numeric score")]
    MalformedPayload,
}

impl EthosClient {
    pub fn new(http: reqwest::Client, config: &EthosConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
        }
    }

    pub async fn fetch_score(&self, address: &str) -> Result<ReputationSnapshot, ReputationError> {
        let url = format!("{}/api/v2/user/by/address/{}", self.base_url, address);
        let response = self
            .http
            .get(url)
            .header("X-Ethos-Client", &self.client_id)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ReputationError::UnknownAddress);
        }
        if !status.is_success() {
            return Err(ReputationError::UpstreamStatus(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let score = score_from_payload(&body).ok_or(ReputationError::MalformedPayload)?;

        Ok(ReputationSnapshot {
            score,
            source: "ethos",
            updated_at: Utc::now(),
        })
    }
}

/// The graph serves integer scores today; floats are rounded rather than
/// rejected so a representation change upstream stays readable.
fn score_from_payload(body: &Value) -> Option<i64> {
    body.get("score")
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_integer_scores() {
        let body = json!({ "score": 1724, "profileId": 99 });
        assert_eq!(score_from_payload(&body), Some(1724));
    }

    #[test]
    fn rounds_float_scores() {
        let body = json!({ "score": 1550.6 });
        assert_eq!(score_from_payload(&body), Some(1551));
    }

    #[test]
    fn rejects_payloads_without_a_numeric_score() {
        assert_eq!(score_from_payload(&json!({ "score": "high" })), None);
        assert_eq!(score_from_payload(&json!({ "profileId": 4 })), None);
        assert_eq!(score_from_payload(&json!(null)), None);
    }
}
