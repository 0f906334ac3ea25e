//! Reputation-gated virtual card issuance.
//!
//! The crate turns an Ethos reputation score into a tier (and with it card
//! eligibility, cashback and fee rates), canonicalizes the card issuer's
//! pricing quotes, and drives card orders from creation through settlement
//! polling to the post-completion dashboard refresh. HTTP surfaces live in
//! the companion API service; everything here is the domain core.

pub mod config;
pub mod error;
pub mod identity;
pub mod orders;
pub mod pricing;
pub mod reputation;
pub mod rewards;
pub mod telemetry;
