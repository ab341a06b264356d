//! Attempt limiter contract.
//!
//! Two independent counter families defend the public scan path:
//!
//! - IP-scoped request counters (budget per source address per window)
//! - token-scoped PIN failure counters (lockout after repeated failures)
//!
//! # Security Considerations
//!
//! - Increments must be atomic per key; two concurrent guesses must not both
//!   observe the pre-lock count and slip past the threshold
//! - Different keys must not contend on a shared lock
//! - A locked token rejects even the correct PIN until the window elapses or
//!   the token rotates
//! - Counters keyed by a rotated-away token are discarded with it

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::config::{IpRateLimitConfig, PinLockoutConfig};
use crate::error::CardResult;

/// Outcome of an IP budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpDecision {
    Allowed,
    RateLimited,
}

/// Lockout state of a token's PIN counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    Unlocked,
    Locked,
}

/// Keyed short-lived counters with TTL semantics.
///
/// Thresholds and windows are supplied per call from [`crate::config`] so
/// that implementations stay policy-free and deployments can re-tune without
/// touching stored state.
///
/// # Implementations
///
/// - `digicare-db-memory` — DashMap-backed counters, atomic via the entry API
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Atomically counts one scan attempt from `ip` and decides whether it
    /// is still within budget.
    ///
    /// Returns [`IpDecision::RateLimited`] once `limit.ip_threshold`
    /// attempts have already landed inside the current window; the counter
    /// is capped rather than grown past the threshold.
    async fn check_and_increment_ip(
        &self,
        ip: &str,
        limit: &IpRateLimitConfig,
        now: OffsetDateTime,
    ) -> CardResult<IpDecision>;

    /// Reports whether `token` is under an active PIN lockout.
    ///
    /// Must be consulted before the PIN is verified: a locked token rejects
    /// even the correct PIN.
    async fn pin_lockout(
        &self,
        token: &str,
        lockout: &PinLockoutConfig,
        now: OffsetDateTime,
    ) -> CardResult<LockoutState>;

    /// Counts one failed PIN check against `token`. The window is anchored
    /// at the first failure it contains.
    ///
    /// Returns the failure count after the increment.
    async fn record_pin_failure(
        &self,
        token: &str,
        lockout: &PinLockoutConfig,
        now: OffsetDateTime,
    ) -> CardResult<u32>;

    /// Clears `token`'s failure counter immediately after a successful PIN
    /// verification.
    async fn record_pin_success(&self, token: &str) -> CardResult<()>;

    /// Drops every counter keyed by `token`. Called by the token service on
    /// rotation so a replaced token leaves no lockout state behind.
    async fn discard_token(&self, token: &str) -> CardResult<()>;
}
