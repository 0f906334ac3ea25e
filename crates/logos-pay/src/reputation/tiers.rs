use serde::Serialize;

/// One band of the reputation ladder. Scores map to exactly one band; the
/// band gates card issuance and sets the cashback and fee rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub name: &'static str,
    pub min_score: i64,
    pub max_score: i64,
    pub cashback_percent: f32,
    pub fee_percent: f32,
    pub card_eligible: bool,
    pub color: &'static str,
}

/// The top band's `max_score` is a sentinel; anything outside the table
/// resolves to the first band.
pub const TIERS: [Tier; 10] = [
    Tier {
        name: "Untrusted",
        min_score: 0,
        max_score: 799,
        cashback_percent: 0.0,
        fee_percent: 5.0,
        card_eligible: false,
        color: "#EF4444",
    },
    Tier {
        name: "Questionable",
        min_score: 800,
        max_score: 1199,
        cashback_percent: 0.0,
        fee_percent: 4.0,
        card_eligible: false,
        color: "#F97316",
    },
    Tier {
        name: "Neutral",
        min_score: 1200,
        max_score: 1399,
        cashback_percent: 1.0,
        fee_percent: 3.5,
        card_eligible: true,
        color: "#EAB308",
    },
    Tier {
        name: "Known",
        min_score: 1400,
        max_score: 1599,
        cashback_percent: 2.0,
        fee_percent: 3.0,
        card_eligible: true,
        color: "#84CC16",
    },
    Tier {
        name: "Established",
        min_score: 1600,
        max_score: 1799,
        cashback_percent: 3.0,
        fee_percent: 2.5,
        card_eligible: true,
        color: "#22C55E",
    },
    Tier {
        name: "Reputable",
        min_score: 1800,
        max_score: 1999,
        cashback_percent: 4.0,
        fee_percent: 2.0,
        card_eligible: true,
        color: "#14B8A6",
    },
    Tier {
        name: "Exemplary",
        min_score: 2000,
        max_score: 2199,
        cashback_percent: 5.0,
        fee_percent: 1.5,
        card_eligible: true,
        color: "#06B6D4",
    },
    Tier {
        name: "Distinguished",
        min_score: 2200,
        max_score: 2399,
        cashback_percent: 6.0,
        fee_percent: 1.0,
        card_eligible: true,
        color: "#3B82F6",
    },
    Tier {
        name: "Revered",
        min_score: 2400,
        max_score: 2599,
        cashback_percent: 8.0,
        fee_percent: 0.5,
        card_eligible: true,
        color: "#8B5CF6",
    },
    Tier {
        name: "Renowned",
        min_score: 2600,
        max_score: 10000,
        cashback_percent: 10.0,
        fee_percent: 0.0,
        card_eligible: true,
        color: "#C9A24D",
    },
];

/// Resolved band plus how far the score sits from the next one.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierProgress {
    pub tier: &'static Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<&'static Tier>,
    pub points_to_next_tier: i64,
}

fn band_index(score: i64) -> usize {
    TIERS
        .iter()
        .position(|tier| score >= tier.min_score && score <= tier.max_score)
        .unwrap_or(0)
}

/// First band whose range contains the score. Negative, malformed or
/// out-of-table scores fall back to the lowest band.
pub fn resolve_tier(score: i64) -> &'static Tier {
    &TIERS[band_index(score)]
}

pub fn tier_with_progress(score: i64) -> TierProgress {
    let index = band_index(score);
    let next_tier = TIERS.get(index + 1);
    let points_to_next_tier = next_tier
        .map(|next| next.min_score.saturating_sub(score).max(0))
        .unwrap_or(0);

    TierProgress {
        tier: &TIERS[index],
        next_tier,
        points_to_next_tier,
    }
}
