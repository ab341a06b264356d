//! Scan security configuration.
//!
//! Thresholds, windows and PIN policy are deployment-tunable rather than
//! hardcoded so that operators can tighten or relax the limits without a
//! rebuild.
//!
//! # Example (TOML)
//!
//! ```toml
//! [card.rate_limiting]
//! ip_threshold = 10
//! ip_window = "1h"
//!
//! [card.lockout]
//! threshold = 3
//! window = "30m"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the card verification core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CardConfig {
    /// Per-source-IP request budget on the public scan path.
    pub rate_limiting: IpRateLimitConfig,

    /// Per-token PIN failure lockout.
    pub lockout: PinLockoutConfig,

    /// PIN format and weak-pattern policy.
    pub pin: PinPolicy,

    /// Record bundle list caps.
    pub bundle: BundleLimits,

    /// Card validity period granted at issuance.
    #[serde(with = "humantime_serde")]
    pub validity: Duration,

    /// Budget for the fire-and-forget owner notification; the scan response
    /// never waits on it.
    #[serde(with = "humantime_serde")]
    pub notification_timeout: Duration,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            rate_limiting: IpRateLimitConfig::default(),
            lockout: PinLockoutConfig::default(),
            pin: PinPolicy::default(),
            bundle: BundleLimits::default(),
            validity: Duration::from_secs(365 * 24 * 3600), // 1 year
            notification_timeout: Duration::from_secs(5),
        }
    }
}

/// IP-scoped scan budget. At the threshold further requests are rejected
/// until the window rolls over.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IpRateLimitConfig {
    /// Attempts allowed per window per IP.
    pub ip_threshold: u32,

    /// Counting window.
    #[serde(with = "humantime_serde")]
    pub ip_window: Duration,
}

impl Default for IpRateLimitConfig {
    fn default() -> Self {
        Self {
            ip_threshold: 10,
            ip_window: Duration::from_secs(3600), // 1 hour
        }
    }
}

/// Token-scoped PIN failure lockout. A locked token rejects every attempt,
/// correct PIN included, until the window elapses or the token rotates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PinLockoutConfig {
    /// Failed PIN checks that trigger the lock.
    pub threshold: u32,

    /// Lockout window, measured from the first failure in the window.
    #[serde(with = "humantime_serde")]
    pub window: Duration,
}

impl Default for PinLockoutConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            window: Duration::from_secs(30 * 60), // 30 minutes
        }
    }
}

/// PIN format bounds and denylisted weak patterns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PinPolicy {
    /// Minimum PIN length in digits.
    pub min_length: usize,

    /// Maximum PIN length in digits.
    pub max_length: usize,

    /// Exact sequential patterns rejected outright. All-identical-digit
    /// PINs are rejected independently of this list.
    pub denylist: Vec<String>,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 8,
            denylist: vec![
                "123456".to_string(),
                "654321".to_string(),
                "12345678".to_string(),
                "87654321".to_string(),
            ],
        }
    }
}

/// Caps on the detail lists inside a record bundle. Aggregate counts are
/// always reported even when a list is truncated.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleLimits {
    pub max_appointments: usize,
    pub max_consultations: usize,
    pub max_prescriptions: usize,
}

impl Default for BundleLimits {
    fn default() -> Self {
        Self {
            max_appointments: 10,
            max_consultations: 10,
            max_prescriptions: 10,
        }
    }
}

impl CardConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limiting.ip_threshold == 0 {
            return Err("card.rate_limiting.ip_threshold must be > 0".into());
        }
        if self.rate_limiting.ip_window.is_zero() {
            return Err("card.rate_limiting.ip_window must be > 0".into());
        }
        if self.lockout.threshold == 0 {
            return Err("card.lockout.threshold must be > 0".into());
        }
        if self.lockout.window.is_zero() {
            return Err("card.lockout.window must be > 0".into());
        }
        if self.pin.min_length == 0 || self.pin.min_length > self.pin.max_length {
            return Err("card.pin length bounds are inconsistent".into());
        }
        if self.validity.is_zero() {
            return Err("card.validity must be > 0".into());
        }
        Ok(())
    }
}
