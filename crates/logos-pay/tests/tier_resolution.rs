//! Integration specifications for the reputation tier ladder.
//!
//! Exercises the public resolution API over the whole score domain: band
//! exclusivity, the out-of-table fallback, progress arithmetic, and the wire
//! shape dashboards consume.

use logos_pay::reputation::{resolve_tier, tier_with_progress, TIERS};

#[test]
fn every_score_in_the_table_matches_exactly_one_band() {
    for score in 0..=10_000i64 {
        let matching = TIERS
            .iter()
            .filter(|tier| score >= tier.min_score && score <= tier.max_score)
            .count();
        assert_eq!(matching, 1, "score {score} matched {matching} bands");
    }
}

#[test]
fn scores_outside_the_table_fall_back_to_the_lowest_band() {
    for score in [-1, -800, i64::MIN, 10_001, i64::MAX] {
        assert_eq!(resolve_tier(score).name, "Untrusted", "score {score}");
    }
}

#[test]
fn band_boundaries_resolve_inclusively() {
    for tier in TIERS.iter() {
        assert_eq!(resolve_tier(tier.min_score).name, tier.name);
        assert_eq!(resolve_tier(tier.max_score).name, tier.name);
    }
}

#[test]
fn card_eligibility_switches_on_at_neutral_and_never_off_again() {
    let first_eligible = TIERS
        .iter()
        .position(|tier| tier.card_eligible)
        .expect("an eligible band exists");

    assert_eq!(TIERS[first_eligible].name, "Neutral");
    assert_eq!(TIERS[first_eligible].min_score, 1200);
    for tier in &TIERS[first_eligible..] {
        assert!(tier.card_eligible, "{} should stay eligible", tier.name);
    }
    for tier in &TIERS[..first_eligible] {
        assert!(!tier.card_eligible, "{} should be ineligible", tier.name);
    }
}

#[test]
fn rates_improve_monotonically_up_the_ladder() {
    for pair in TIERS.windows(2) {
        assert!(
            pair[1].cashback_percent >= pair[0].cashback_percent,
            "cashback regresses between {} and {}",
            pair[0].name,
            pair[1].name
        );
        assert!(
            pair[1].fee_percent <= pair[0].fee_percent,
            "fee regresses between {} and {}",
            pair[0].name,
            pair[1].name
        );
    }
}

#[test]
fn progress_reports_the_points_needed_for_the_next_band() {
    let progress = tier_with_progress(1550);
    assert_eq!(progress.tier.name, "Known");
    assert_eq!(progress.next_tier.map(|tier| tier.name), Some("Established"));
    assert_eq!(progress.points_to_next_tier, 50);

    // One point short of a boundary needs exactly one point.
    let progress = tier_with_progress(1199);
    assert_eq!(progress.tier.name, "Questionable");
    assert_eq!(progress.points_to_next_tier, 1);
}

#[test]
fn the_top_band_reports_no_further_progress() {
    for score in [2600, 5000, 10_000] {
        let progress = tier_with_progress(score);
        assert_eq!(progress.tier.name, "Renowned");
        assert!(progress.next_tier.is_none());
        assert_eq!(progress.points_to_next_tier, 0);
    }
}

#[test]
fn progress_serializes_for_the_dashboard() {
    let value = serde_json::to_value(tier_with_progress(1550)).expect("progress serializes");

    assert_eq!(value["tier"]["name"], "Known");
    assert_eq!(value["tier"]["cardEligible"], true);
    assert_eq!(value["tier"]["cashbackPercent"], 2.0);
    assert_eq!(value["nextTier"]["name"], "Established");
    assert_eq!(value["pointsToNextTier"], 50);

    // The top band omits nextTier instead of serializing null.
    let value = serde_json::to_value(tier_with_progress(2600)).expect("progress serializes");
    assert!(value.get("nextTier").is_none());
    assert_eq!(value["pointsToNextTier"], 0);
}
