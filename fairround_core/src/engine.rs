use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::VerifyResult,
    payout::{compute_multiplier, same_at_precision, VerificationConfig},
    rng::{compute_hash, extract_u32, map_to_float},
    seeds::{SeedSet, SeedSource},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub hash: String, // 64 lowercase hex chars
    pub raw_int: u32,
    pub unit_float: f64,
    pub multiplier: f64,
    /// Unrevealed means the round cannot be considered verified.
    pub seed_source: SeedSource,
}

impl VerificationResult {
    /// Whether `reported` names this multiplier at `precision` digits.
    pub fn matches_reported(&self, reported: f64, precision: u32) -> bool {
        same_at_precision(reported, self.multiplier, precision)
    }
}

/// Runs hash -> u32 -> unit float -> multiplier for one round.
pub fn verify(seeds: &SeedSet, config: &VerificationConfig) -> VerifyResult<VerificationResult> {
    config.validate()?;
    let hash = compute_hash(seeds.server_seed(), seeds.client_seed(), seeds.nonce())?;
    let raw_int = extract_u32(&hash)?;
    let unit_float = map_to_float(raw_int);
    let multiplier = compute_multiplier(unit_float, config);
    debug!(nonce = seeds.nonce(), raw_int, multiplier, "round recomputed");
    Ok(VerificationResult {
        hash,
        raw_int,
        unit_float,
        multiplier,
        seed_source: seeds.source(),
    })
}

/// Checks an operator-reported multiplier against the recomputed one.
/// Digits of `expected` beyond the configured precision are dropped, so a
/// report of `3.849` matches a recomputed `3.84` at precision 2.
pub fn verify_multiplier(
    seeds: &SeedSet,
    config: &VerificationConfig,
    expected: f64,
) -> VerifyResult<bool> {
    let result = verify(seeds, config)?;
    Ok(result.matches_reported(expected, config.precision))
}

/// Recomputes every nonce in `nonces` under the same seed pair.
pub fn verify_nonce_range<'a>(
    seeds: &'a SeedSet,
    config: &'a VerificationConfig,
    nonces: RangeInclusive<u64>,
) -> impl Iterator<Item = (u64, VerifyResult<VerificationResult>)> + 'a {
    nonces.map(move |nonce| (nonce, verify(&seeds.with_nonce(nonce), config)))
}
