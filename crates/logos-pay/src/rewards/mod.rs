//! Cashback rewards: typed consumer of the rewards backend plus the
//! ledger-entry mapping the dashboard renders.

pub mod client;

use serde::{Deserialize, Serialize};

pub use client::{RewardsClient, RewardsError};

/// Merchant rotation used when simulating card activity.
pub const MERCHANTS: [&str; 9] = [
    "Starbucks",
    "Uber",
    "Amazon",
    "Apple",
    "Netflix",
    "Whole Foods",
    "Target",
    "Shell",
    "Delta",
];

const CLAIM_MERCHANT: &str = "Simulated Spend";
const ACTIVITY_MERCHANT: &str = "Logos Card Activity";

/// Rollup served by the rewards backend for one wallet.
#[derive(Debug, Clone, Deserialize)]
pub struct CashbackSummary {
    #[serde(default)]
    pub total_earned_usd: f64,
    #[serde(default)]
    pub current_month_earned_usd: f64,
    #[serde(default)]
    pub current_tier_name: String,
    #[serde(default)]
    pub current_cashback_percent: f64,
    #[serde(default)]
    pub history: Vec<RewardLedgerEntry>,
}

impl CashbackSummary {
    /// Served when the backend is unreachable so dashboards render zeros
    /// instead of erroring.
    pub fn empty() -> Self {
        Self {
            total_earned_usd: 0.0,
            current_month_earned_usd: 0.0,
            current_tier_name: "Unknown".to_string(),
            current_cashback_percent: 0.0,
            history: Vec::new(),
        }
    }
}

/// One backend ledger row.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardLedgerEntry {
    pub id: String,
    #[serde(default)]
    pub tier_name: Option<String>,
    #[serde(default)]
    pub cashback_percent: f64,
    #[serde(default)]
    pub reward_amount_usd: f64,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Ledger row shaped for display: the spend is estimated back from the
/// reward and rate since the ledger only stores what was earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTransaction {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_name: Option<String>,
    pub merchant: &'static str,
    pub amount: f64,
    pub cashback_rate: f64,
    pub cashback_earned: f64,
    pub date: String,
}

pub fn transaction_from_entry(entry: &RewardLedgerEntry) -> RewardTransaction {
    let rate = entry.cashback_percent;
    let earned = entry.reward_amount_usd;
    let estimated_spend = if rate > 0.0 { earned / (rate / 100.0) } else { 0.0 };

    RewardTransaction {
        id: entry.id.clone(),
        tier_name: entry.tier_name.clone(),
        merchant: if entry.source.as_deref() == Some("claim") {
            CLAIM_MERCHANT
        } else {
            ACTIVITY_MERCHANT
        },
        amount: estimated_spend,
        cashback_rate: rate,
        cashback_earned: earned,
        date: entry.created_at.clone(),
    }
}

/// Cashback for one purchase, rounded to cents.
pub fn cashback_earned(amount: f64, rate_percent: f64) -> f64 {
    (amount * rate_percent / 100.0 * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: Option<&str>, rate: f64, reward: f64) -> RewardLedgerEntry {
        RewardLedgerEntry {
            id: "rw-1".to_string(),
            tier_name: Some("Established".to_string()),
            cashback_percent: rate,
            reward_amount_usd: reward,
            source: source.map(str::to_string),
            created_at: "2026-08-01T09:00:00Z".to_string(),
        }
    }

    #[test]
    fn estimates_spend_from_reward_and_rate() {
        let transaction = transaction_from_entry(&entry(None, 2.0, 5.0));
        assert_eq!(transaction.amount, 250.0);
        assert_eq!(transaction.cashback_earned, 5.0);
        assert_eq!(transaction.merchant, "Logos Card Activity");
    }

    #[test]
    fn zero_rates_estimate_no_spend() {
        let transaction = transaction_from_entry(&entry(None, 0.0, 5.0));
        assert_eq!(transaction.amount, 0.0);
    }

    #[test]
    fn claims_render_as_simulated_spend() {
        let transaction = transaction_from_entry(&entry(Some("claim"), 3.0, 1.5));
        assert_eq!(transaction.merchant, "Simulated Spend");
        assert_eq!(transaction.amount, 50.0);
    }

    #[test]
    fn cashback_rounds_to_cents() {
        assert_eq!(cashback_earned(1234.567, 2.5), 30.86);
        assert_eq!(cashback_earned(100.0, 3.0), 3.0);
        assert_eq!(cashback_earned(0.0, 5.0), 0.0);
    }

    #[test]
    fn empty_summary_reads_as_unknown_tier() {
        let summary = CashbackSummary::empty();
        assert_eq!(summary.current_tier_name, "Unknown");
        assert_eq!(summary.total_earned_usd, 0.0);
        assert!(summary.history.is_empty());
    }
}
