//! In-memory attempt counters.
//!
//! Fixed-window counters keyed by source IP or access token. The DashMap
//! entry API makes every increment-and-compare atomic per key; unrelated
//! keys live in different shard slots and do not contend on a global lock.

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use digicare_card::config::{IpRateLimitConfig, PinLockoutConfig};
use digicare_card::error::CardResult;
use digicare_card::limiter::{AttemptStore, IpDecision, LockoutState};

/// One fixed counting window, anchored at its first event.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: OffsetDateTime,
}

impl Window {
    fn expired(&self, window: std::time::Duration, now: OffsetDateTime) -> bool {
        now - self.started_at >= window
    }
}

/// DashMap-backed implementation of [`AttemptStore`].
///
/// IP and PIN counters use disjoint key namespaces so an access token that
/// happens to equal an IP string (it cannot, but cheap to rule out) never
/// shares a counter.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    windows: DashMap<String, Window>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ip_key(ip: &str) -> String {
        format!("ip:{ip}")
    }

    fn pin_key(token: &str) -> String {
        format!("pin:{token}")
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn check_and_increment_ip(
        &self,
        ip: &str,
        limit: &IpRateLimitConfig,
        now: OffsetDateTime,
    ) -> CardResult<IpDecision> {
        let mut entry = self
            .windows
            .entry(Self::ip_key(ip))
            .or_insert(Window {
                count: 0,
                started_at: now,
            });
        let window = entry.value_mut();
        if window.expired(limit.ip_window, now) {
            *window = Window {
                count: 1,
                started_at: now,
            };
            return Ok(IpDecision::Allowed);
        }
        if window.count >= limit.ip_threshold {
            // Capped at the threshold; over-budget attempts do not extend
            // the window.
            return Ok(IpDecision::RateLimited);
        }
        window.count += 1;
        Ok(IpDecision::Allowed)
    }

    async fn pin_lockout(
        &self,
        token: &str,
        lockout: &PinLockoutConfig,
        now: OffsetDateTime,
    ) -> CardResult<LockoutState> {
        let key = Self::pin_key(token);
        let Some(window) = self.windows.get(&key).map(|e| *e.value()) else {
            return Ok(LockoutState::Unlocked);
        };
        if window.expired(lockout.window, now) {
            self.windows.remove(&key);
            return Ok(LockoutState::Unlocked);
        }
        if window.count >= lockout.threshold {
            return Ok(LockoutState::Locked);
        }
        Ok(LockoutState::Unlocked)
    }

    async fn record_pin_failure(
        &self,
        token: &str,
        lockout: &PinLockoutConfig,
        now: OffsetDateTime,
    ) -> CardResult<u32> {
        let mut entry = self
            .windows
            .entry(Self::pin_key(token))
            .or_insert(Window {
                count: 0,
                started_at: now,
            });
        let window = entry.value_mut();
        if window.expired(lockout.window, now) {
            *window = Window {
                count: 1,
                started_at: now,
            };
        } else {
            window.count += 1;
        }
        Ok(window.count)
    }

    async fn record_pin_success(&self, token: &str) -> CardResult<()> {
        self.windows.remove(&Self::pin_key(token));
        Ok(())
    }

    async fn discard_token(&self, token: &str) -> CardResult<()> {
        self.windows.remove(&Self::pin_key(token));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap()
    }

    fn ip_limit() -> IpRateLimitConfig {
        IpRateLimitConfig {
            ip_threshold: 10,
            ip_window: std::time::Duration::from_secs(3600),
        }
    }

    fn lockout() -> PinLockoutConfig {
        PinLockoutConfig {
            threshold: 3,
            window: std::time::Duration::from_secs(30 * 60),
        }
    }

    #[tokio::test]
    async fn test_ip_budget_allows_exactly_threshold() {
        let store = InMemoryAttemptStore::new();
        for i in 0..10 {
            let decision = store
                .check_and_increment_ip("203.0.113.9", &ip_limit(), now())
                .await
                .unwrap();
            assert_eq!(decision, IpDecision::Allowed, "attempt {i} should pass");
        }
        let decision = store
            .check_and_increment_ip("203.0.113.9", &ip_limit(), now())
            .await
            .unwrap();
        assert_eq!(decision, IpDecision::RateLimited);
    }

    #[tokio::test]
    async fn test_ip_budget_is_per_ip() {
        let store = InMemoryAttemptStore::new();
        for _ in 0..11 {
            let _ = store
                .check_and_increment_ip("203.0.113.9", &ip_limit(), now())
                .await
                .unwrap();
        }
        let other = store
            .check_and_increment_ip("203.0.113.10", &ip_limit(), now())
            .await
            .unwrap();
        assert_eq!(other, IpDecision::Allowed);
    }

    #[tokio::test]
    async fn test_ip_window_rollover_resets_budget() {
        let store = InMemoryAttemptStore::new();
        for _ in 0..11 {
            let _ = store
                .check_and_increment_ip("203.0.113.9", &ip_limit(), now())
                .await
                .unwrap();
        }
        let later = now() + Duration::hours(1);
        let decision = store
            .check_and_increment_ip("203.0.113.9", &ip_limit(), later)
            .await
            .unwrap();
        assert_eq!(decision, IpDecision::Allowed);
    }

    #[tokio::test]
    async fn test_lockout_engages_at_threshold() {
        let store = InMemoryAttemptStore::new();
        for expected in 1..=3 {
            let count = store
                .record_pin_failure("hc_t", &lockout(), now())
                .await
                .unwrap();
            assert_eq!(count, expected);
        }
        let state = store.pin_lockout("hc_t", &lockout(), now()).await.unwrap();
        assert_eq!(state, LockoutState::Locked);
    }

    #[tokio::test]
    async fn test_two_failures_do_not_lock() {
        let store = InMemoryAttemptStore::new();
        store.record_pin_failure("hc_t", &lockout(), now()).await.unwrap();
        store.record_pin_failure("hc_t", &lockout(), now()).await.unwrap();
        let state = store.pin_lockout("hc_t", &lockout(), now()).await.unwrap();
        assert_eq!(state, LockoutState::Unlocked);
    }

    #[tokio::test]
    async fn test_lockout_expires_with_window() {
        let store = InMemoryAttemptStore::new();
        for _ in 0..3 {
            store.record_pin_failure("hc_t", &lockout(), now()).await.unwrap();
        }
        let later = now() + Duration::minutes(30);
        let state = store.pin_lockout("hc_t", &lockout(), later).await.unwrap();
        assert_eq!(state, LockoutState::Unlocked);
    }

    #[tokio::test]
    async fn test_success_clears_counter_immediately() {
        let store = InMemoryAttemptStore::new();
        store.record_pin_failure("hc_t", &lockout(), now()).await.unwrap();
        store.record_pin_failure("hc_t", &lockout(), now()).await.unwrap();
        store.record_pin_success("hc_t").await.unwrap();
        let count = store
            .record_pin_failure("hc_t", &lockout(), now())
            .await
            .unwrap();
        assert_eq!(count, 1, "counter should restart after a success");
    }

    #[tokio::test]
    async fn test_discard_removes_lockout_state() {
        let store = InMemoryAttemptStore::new();
        for _ in 0..3 {
            store.record_pin_failure("hc_old", &lockout(), now()).await.unwrap();
        }
        store.discard_token("hc_old").await.unwrap();
        let state = store.pin_lockout("hc_old", &lockout(), now()).await.unwrap();
        assert_eq!(state, LockoutState::Unlocked);
    }

    #[tokio::test]
    async fn test_ip_and_pin_keys_do_not_collide() {
        let store = InMemoryAttemptStore::new();
        for _ in 0..3 {
            store.record_pin_failure("203.0.113.9", &lockout(), now()).await.unwrap();
        }
        let decision = store
            .check_and_increment_ip("203.0.113.9", &ip_limit(), now())
            .await
            .unwrap();
        assert_eq!(decision, IpDecision::Allowed);
    }
}
