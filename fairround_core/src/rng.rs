use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{SeedField, VerifyError, VerifyResult};

// Provably-fair HMAC construction:
// server_seed (key) + "client_seed:nonce" (message) -> HMAC-SHA256 -> hex
// -> first 4 bytes as big-endian u32 -> float in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// Hex characters consumed by [`extract_u32`].
pub const PREFIX_HEX_LEN: usize = 8;

/// 2^32, the divisor that maps a u32 into [0,1).
pub const U32_RANGE: f64 = 4_294_967_296.0;

pub fn hmac_bytes(server_seed: &str, client_seed: &str, nonce: &str) -> VerifyResult<[u8; 32]> {
    if server_seed.is_empty() {
        return Err(VerifyError::MissingSeed {
            field: SeedField::ServerSeed,
        });
    }
    if client_seed.is_empty() {
        return Err(VerifyError::MissingSeed {
            field: SeedField::ClientSeed,
        });
    }
    // HMAC accepts keys of any length; the error arm is unreachable for SHA-256.
    let mut mac = HmacSha256::new_from_slice(server_seed.as_bytes())
        .map_err(|e| VerifyError::InvalidHash(format!("hmac key rejected: {e}")))?;
    let msg = format!("{}:{}", client_seed, nonce);
    mac.update(msg.as_bytes());
    let res = mac.finalize().into_bytes();
    let mut out = [0u8; 32];
    out.copy_from_slice(&res);
    Ok(out)
}

/// HMAC-SHA256 of `client_seed:nonce` keyed by the raw server seed bytes,
/// as 64 lowercase hex characters.
pub fn compute_hash(server_seed: &str, client_seed: &str, nonce: &str) -> VerifyResult<String> {
    hmac_bytes(server_seed, client_seed, nonce).map(hex::encode)
}

/// Reads the first 8 hex characters of `hash_hex` as a big-endian u32.
pub fn extract_u32(hash_hex: &str) -> VerifyResult<u32> {
    let prefix = hash_hex.get(..PREFIX_HEX_LEN).ok_or_else(|| {
        VerifyError::InvalidHash(format!(
            "expected at least {PREFIX_HEX_LEN} hex characters, got {}",
            hash_hex.len()
        ))
    })?;
    // from_str_radix tolerates a leading '+', which is not part of a digest.
    if !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(VerifyError::InvalidHash(format!(
            "non-hex prefix {prefix:?}"
        )));
    }
    u32::from_str_radix(prefix, 16).map_err(|e| VerifyError::InvalidHash(e.to_string()))
}

pub fn map_to_float(v: u32) -> f64 {
    (v as f64) / U32_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let h1 = compute_hash("server", "client", "1").unwrap();
        let h2 = compute_hash("server", "client", "1").unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_reference_digest() {
        let h = compute_hash("abc", "def", "1").unwrap();
        assert_eq!(
            h,
            "41e9f684f6bf4fc30b186afbf36b9d28e0a0b834c17cdb4ab93490c1f3c75df7"
        );
    }

    #[test]
    fn test_nonce_changes_digest() {
        let a = compute_hash("server", "client", "1").unwrap();
        let b = compute_hash("server", "client", "2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_seeds_rejected_before_hashing() {
        assert_eq!(
            compute_hash("", "client", "0"),
            Err(VerifyError::MissingSeed {
                field: SeedField::ServerSeed
            })
        );
        assert_eq!(
            compute_hash("server", "", "0"),
            Err(VerifyError::MissingSeed {
                field: SeedField::ClientSeed
            })
        );
    }

    #[test]
    fn test_extract_prefix() {
        assert_eq!(extract_u32("00000000ffff").unwrap(), 0);
        assert_eq!(extract_u32("ffffffff").unwrap(), u32::MAX);
        assert_eq!(extract_u32("41e9f684f6bf").unwrap(), 1_105_852_036);
        assert_eq!(extract_u32("0000002A").unwrap(), 42);
    }

    #[test]
    fn test_extract_rejects_short_or_non_hex() {
        assert!(matches!(extract_u32("abc"), Err(VerifyError::InvalidHash(_))));
        assert!(matches!(extract_u32(""), Err(VerifyError::InvalidHash(_))));
        assert!(matches!(extract_u32("+1234567"), Err(VerifyError::InvalidHash(_))));
        assert!(matches!(extract_u32("zzzzzzzz"), Err(VerifyError::InvalidHash(_))));
        // multi-byte char straddling the prefix boundary
        assert!(matches!(extract_u32("abcdefgé"), Err(VerifyError::InvalidHash(_))));
    }

    #[test]
    fn test_map_bounds() {
        assert_eq!(map_to_float(0), 0.0);
        assert!(map_to_float(u32::MAX) < 1.0);
        assert_eq!(map_to_float(1 << 31), 0.5);
    }
}
