#![deny(rustdoc::broken_intra_doc_links)]

pub mod engine;
pub mod error;
pub mod payout;
pub mod rng;
pub mod seeds;

pub use crate::engine::{verify, verify_multiplier, verify_nonce_range, VerificationResult};
pub use crate::error::{SeedField, VerifyError, VerifyResult};
pub use crate::payout::{
    compute_multiplier, same_at_precision, truncate_to_precision, VerificationConfig,
};
pub use crate::rng::{compute_hash, extract_u32, hmac_bytes, map_to_float};
pub use crate::seeds::{parse_labels, SeedSet, SeedSource};
