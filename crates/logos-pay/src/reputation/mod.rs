//! Reputation scores and the tier ladder they map onto.
//!
//! Scores come from the external Ethos graph; the ladder is static data owned
//! by this crate. Everything downstream (card eligibility, cashback and fee
//! rates) keys off the resolved tier.

pub mod client;
pub mod tiers;

pub use client::{EthosClient, ReputationError, ReputationSnapshot};
pub use tiers::{resolve_tier, tier_with_progress, Tier, TierProgress, TIERS};
