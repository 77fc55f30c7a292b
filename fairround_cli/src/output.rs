//! Text rendering for verification results.

use fairround_core::{SeedSet, SeedSource, VerificationResult};
use serde::Serialize;

/// One CSV / table line of a nonce sweep.
#[derive(Debug, Serialize)]
pub struct RangeRow {
    pub nonce: u64,
    pub hash: String,
    pub raw_int: u32,
    pub unit_float: f64,
    pub multiplier: f64,
    pub seed_source: SeedSource,
}

impl RangeRow {
    pub fn new(nonce: u64, r: VerificationResult) -> Self {
        Self {
            nonce,
            hash: r.hash,
            raw_int: r.raw_int,
            unit_float: r.unit_float,
            multiplier: r.multiplier,
            seed_source: r.seed_source,
        }
    }
}

pub fn format_result(r: &VerificationResult) -> String {
    format!(
        "HMAC        : {}\nUint32      : {}\nFloat       : {}\nMultiplier  : {}\nSeed source : {}\n",
        r.hash, r.raw_int, r.unit_float, r.multiplier, r.seed_source
    )
}

pub fn format_seeds(seeds: &SeedSet) -> String {
    format!(
        "Server seed : {} ({})\nClient seed : {}\nNonce       : {}\n",
        display_or_missing(seeds.server_seed()),
        seeds.source(),
        display_or_missing(seeds.client_seed()),
        seeds.nonce()
    )
}

#[allow(clippy::print_literal)]
pub fn print_range_header() {
    println!("{:>10} {:<64} {:>10} {}", "NONCE", "HMAC", "UINT32", "MULTIPLIER");
    println!("{}", "-".repeat(100));
}

pub fn format_range_row(row: &RangeRow) -> String {
    format!(
        "{:>10} {:<64} {:>10} {}",
        row.nonce, row.hash, row.raw_int, row.multiplier
    )
}

fn display_or_missing(s: &str) -> &str {
    if s.is_empty() {
        "<missing>"
    } else {
        s
    }
}
