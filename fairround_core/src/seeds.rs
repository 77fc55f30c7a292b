//! Seed inputs and the labeled form produced by seed-acquisition tools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SeedField, VerifyError, VerifyResult};

pub const LABEL_SERVER_SEED_REVEALED: &str = "Server seed (revealed)";
pub const LABEL_SERVER_SEED: &str = "Server seed";
pub const LABEL_CLIENT_SEED: &str = "Client seed";
pub const LABEL_NONCE: &str = "Nonce";

pub const DEFAULT_NONCE: &str = "0";

/// Where the server seed came from.
///
/// An unrevealed seed is still the operator's live secret, so a result
/// computed from it does not prove anything about the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    Revealed,
    Unrevealed,
}

impl SeedSource {
    pub fn is_revealed(self) -> bool {
        self == SeedSource::Revealed
    }
}

impl std::fmt::Display for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::Revealed => f.write_str("revealed"),
            SeedSource::Unrevealed => f.write_str("unrevealed"),
        }
    }
}

/// Server seed, client seed and nonce for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSet {
    server_seed: String,
    client_seed: String,
    nonce: String,
    source: SeedSource,
}

impl SeedSet {
    /// Builds a seed set from a revealed server seed. A nonce that is not a
    /// run of decimal digits becomes `"0"`.
    pub fn new(
        server_seed: impl Into<String>,
        client_seed: impl Into<String>,
        nonce: impl Into<String>,
    ) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce: normalize_nonce(&nonce.into()),
            source: SeedSource::Revealed,
        }
    }

    pub fn with_source(mut self, source: SeedSource) -> Self {
        self.source = source;
        self
    }

    /// Same seeds, different round.
    pub fn with_nonce(&self, nonce: u64) -> Self {
        Self {
            nonce: nonce.to_string(),
            ..self.clone()
        }
    }

    /// Resolves the labeled form. `"Server seed (revealed)"` wins over
    /// `"Server seed"`; the latter marks the set as [`SeedSource::Unrevealed`].
    /// Missing seeds are left empty and rejected at hashing time.
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Self {
        let lookup = |key: &str| {
            labels
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let (server_seed, source) = match lookup(LABEL_SERVER_SEED_REVEALED) {
            Some(seed) => (seed, SeedSource::Revealed),
            None => match lookup(LABEL_SERVER_SEED) {
                Some(seed) => {
                    warn!("no revealed server seed, falling back to the unrevealed one");
                    (seed, SeedSource::Unrevealed)
                }
                None => ("", SeedSource::Revealed),
            },
        };
        let client_seed = lookup(LABEL_CLIENT_SEED).unwrap_or_default();
        let nonce = lookup(LABEL_NONCE).unwrap_or(DEFAULT_NONCE);
        Self::new(server_seed, client_seed, nonce).with_source(source)
    }

    /// Parses the persisted JSON object form. String and number values are
    /// accepted; other value types are only an error on a recognized label.
    pub fn from_json(json: &str) -> VerifyResult<Self> {
        parse_labels(json).map(|labels| Self::from_labels(&labels))
    }

    pub fn server_seed(&self) -> &str {
        &self.server_seed
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn source(&self) -> SeedSource {
        self.source
    }

    /// Checks both seeds are present, in the order the hash generator does.
    pub fn ensure_complete(&self) -> VerifyResult<()> {
        if self.server_seed.is_empty() {
            return Err(VerifyError::MissingSeed {
                field: SeedField::ServerSeed,
            });
        }
        if self.client_seed.is_empty() {
            return Err(VerifyError::MissingSeed {
                field: SeedField::ClientSeed,
            });
        }
        Ok(())
    }
}

/// Reads a JSON object into a label map.
pub fn parse_labels(json: &str) -> VerifyResult<BTreeMap<String, String>> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| VerifyError::MalformedSeeds(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(VerifyError::MalformedSeeds(
            "expected a JSON object of label -> value".into(),
        ));
    };
    let mut labels = BTreeMap::new();
    for (key, value) in map {
        match value {
            Value::String(s) => {
                labels.insert(key, s);
            }
            Value::Number(n) => {
                labels.insert(key, n.to_string());
            }
            other if is_known_label(&key) => {
                return Err(VerifyError::MalformedSeeds(format!(
                    "label {key:?} must be a string, got {other}"
                )));
            }
            _ => debug!(label = %key, "ignoring non-string label"),
        }
    }
    Ok(labels)
}

fn is_known_label(key: &str) -> bool {
    matches!(
        key,
        LABEL_SERVER_SEED_REVEALED | LABEL_SERVER_SEED | LABEL_CLIENT_SEED | LABEL_NONCE
    )
}

fn normalize_nonce(raw: &str) -> String {
    let trimmed = raw.trim();
    // digits of any length, kept verbatim for the HMAC message
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.to_string()
    } else {
        debug!(nonce = raw, "unparsable nonce, using default");
        DEFAULT_NONCE.to_string()
    }
}
