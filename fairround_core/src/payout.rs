use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VerifyError, VerifyResult};

/// Largest integer-valued f64 with every smaller integer also representable (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub const DEFAULT_RTP: f64 = 0.99;
pub const DEFAULT_PRECISION: u32 = 2;

/// Payout model parameters for one verification call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Return-to-player fraction, e.g. 0.99.
    pub rtp: f64,
    /// Decimal digits kept in the multiplier.
    pub precision: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            rtp: DEFAULT_RTP,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl VerificationConfig {
    pub fn new(rtp: f64, precision: u32) -> VerifyResult<Self> {
        let config = Self { rtp, precision };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> VerifyResult<()> {
        if !self.rtp.is_finite() || self.rtp <= 0.0 {
            return Err(VerifyError::InvalidConfig(format!(
                "rtp must be a positive finite number, got {}",
                self.rtp
            )));
        }
        Ok(())
    }
}

/// Resolves a unit float into an outcome multiplier: `floor(max(1, rtp / f))`
/// at `precision` decimal digits.
///
/// A zero (or NaN) float is replaced by the smallest positive normal f64, and a
/// ratio that is not finite is clamped to [`MAX_SAFE_INTEGER`], so the result
/// is always finite and `>= 1`.
pub fn compute_multiplier(unit_float: f64, config: &VerificationConfig) -> f64 {
    let f = if unit_float > 0.0 {
        unit_float
    } else {
        debug!(unit_float, "non-positive unit float, substituting f64::MIN_POSITIVE");
        f64::MIN_POSITIVE
    };
    let mut raw = config.rtp / f;
    if !raw.is_finite() {
        debug!(raw, "non-finite ratio, clamping");
        raw = MAX_SAFE_INTEGER;
    }
    truncate_to_precision(raw.max(1.0), config.precision)
}

/// Floors `value` to `precision` decimal digits. Values whose scaled form
/// would overflow are returned as-is.
pub fn truncate_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.floor() / factor
}

/// Whether an operator-reported multiplier names the same value as a
/// recomputed one at `precision` digits.
///
/// Both sides are compared in units of `10^-precision`. The reported figure
/// is floored (extra digits are dropped) after a small nudge, since decimals
/// such as `4.6` scale to just under their integer (`459.99999999999994`).
pub fn same_at_precision(reported: f64, recomputed: f64, precision: u32) -> bool {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    let reported_units = (reported * factor + 1e-9).floor();
    let recomputed_units = (recomputed * factor).round();
    if !reported_units.is_finite() || !recomputed_units.is_finite() {
        return reported == recomputed;
    }
    reported_units == recomputed_units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(precision: u32) -> VerificationConfig {
        VerificationConfig {
            rtp: 0.99,
            precision,
        }
    }

    #[test]
    fn test_half_gives_198() {
        assert_eq!(compute_multiplier(0.5, &cfg(2)), 1.98);
        assert_eq!(compute_multiplier(0.5, &cfg(1)), 1.9);
        assert_eq!(compute_multiplier(0.5, &cfg(0)), 1.0);
    }

    #[test]
    fn test_zero_guard_is_finite() {
        let m = compute_multiplier(0.0, &cfg(2));
        assert!(m.is_finite());
        assert_eq!(m, 0.99 / f64::MIN_POSITIVE);
        assert_eq!(compute_multiplier(-0.25, &cfg(2)), m);
        assert_eq!(compute_multiplier(f64::NAN, &cfg(2)), m);
    }

    #[test]
    fn test_non_finite_ratio_clamped() {
        let config = VerificationConfig {
            rtp: 10.0,
            precision: 2,
        };
        assert_eq!(compute_multiplier(0.0, &config), MAX_SAFE_INTEGER);
    }

    #[test]
    fn test_large_finite_ratio_kept() {
        let config = VerificationConfig {
            rtp: 1e20,
            precision: 2,
        };
        assert_eq!(compute_multiplier(0.5, &config), 2e20);
    }

    #[test]
    fn test_same_at_precision() {
        assert_eq!(truncate_to_precision(1.13, 2), 1.12);
        assert!(same_at_precision(1.13, 1.13, 2));
        assert!(same_at_precision(4.6, 4.6, 2));
        assert!(same_at_precision(2.01, 2.01, 2));
        assert!(same_at_precision(3.849, 3.84, 2));
        assert!(!same_at_precision(3.85, 3.84, 2));
        assert!(!same_at_precision(4.59, 4.6, 2));
        assert!(same_at_precision(3.0, 3.0, 0));
        assert!(same_at_precision(1.98, 1.98, u32::MAX));
    }

    #[test]
    fn test_floor_at_one() {
        // 0.99 / 0.999 < 1
        assert_eq!(compute_multiplier(0.999, &cfg(2)), 1.0);
        assert_eq!(compute_multiplier(0.99, &cfg(2)), 1.0);
    }

    #[test]
    fn test_truncates_not_rounds() {
        // 0.99 / 0.26 = 3.8076...
        assert_eq!(compute_multiplier(0.26, &cfg(2)), 3.8);
        assert_eq!(truncate_to_precision(2.999, 2), 2.99);
        assert_eq!(truncate_to_precision(1.5, 0), 1.0);
    }

    #[test]
    fn test_huge_precision_keeps_value() {
        let m = compute_multiplier(0.5, &cfg(u32::MAX));
        assert_eq!(m, 1.98);
    }

    #[test]
    fn test_config_validation() {
        assert!(VerificationConfig::new(0.97, 4).is_ok());
        assert!(VerificationConfig::default().validate().is_ok());
        for rtp in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                VerificationConfig::new(rtp, 2),
                Err(VerifyError::InvalidConfig(_))
            ));
        }
    }
}
