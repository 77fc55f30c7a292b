use thiserror::Error;

/// Failures that stop a round from being verified.
///
/// Numeric edge cases inside the multiplier model are not errors; they are
/// clamped in [`crate::payout::compute_multiplier`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyError {
    /// A required seed was absent or empty.
    #[error("missing seed: {field} is empty")]
    MissingSeed { field: SeedField },
    /// The hash is too short or its prefix is not hex.
    #[error("invalid hash: {0}")]
    InvalidHash(String),
    /// The payout model was configured with unusable values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The persisted seed file could not be read as a label map.
    #[error("malformed seeds: {0}")]
    MalformedSeeds(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedField {
    ServerSeed,
    ClientSeed,
}

impl std::fmt::Display for SeedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedField::ServerSeed => f.write_str("server seed"),
            SeedField::ClientSeed => f.write_str("client seed"),
        }
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;
