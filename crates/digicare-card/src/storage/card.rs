//! Card storage trait.
//!
//! # Security Considerations
//!
//! - Token resolution is exact-match only: no prefix matching, no fallback
//!   to the card number
//! - Token rotation must be atomic; there is no window where both the old
//!   and the new token resolve, and none where neither does
//! - Scan bookkeeping (count + timestamp) is a single atomic update

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CardResult;
use digicare_core::HealthCard;

/// Storage trait for issued health cards.
#[async_trait]
pub trait CardStorage: Send + Sync {
    /// Persists a newly issued card.
    ///
    /// # Errors
    ///
    /// Returns an error if the card number or access token collides with an
    /// existing card, or the storage operation fails.
    async fn create(&self, card: &HealthCard) -> CardResult<()>;

    /// Resolves a card by its access token, exact match only.
    ///
    /// Returns the card regardless of status or expiry; the verifier applies
    /// lifecycle checks itself so that every denial is logged with a reason.
    async fn find_by_token(&self, access_token: &str) -> CardResult<Option<HealthCard>>;

    /// Finds the card owned by `owner_id`, if one exists.
    async fn find_by_owner(&self, owner_id: Uuid) -> CardResult<Option<HealthCard>>;

    /// Finds a card by its external id.
    async fn find_by_id(&self, id: Uuid) -> CardResult<Option<HealthCard>>;

    /// Atomically swaps the card's access token.
    ///
    /// Returns `false` when `new_token` collides with another card's token,
    /// in which case nothing changes and the caller retries with a fresh
    /// token.
    async fn rotate_token(&self, card_id: Uuid, new_token: &str) -> CardResult<bool>;

    /// Replaces the stored PIN hash in a single update. `None` clears it.
    async fn set_pin_hash(&self, card_id: Uuid, pin_hash: Option<String>) -> CardResult<()>;

    /// Records one successful scan: increments `scan_count` and sets
    /// `last_scanned_at` as a single atomic update.
    async fn record_scan(&self, card_id: Uuid, scanned_at: OffsetDateTime) -> CardResult<()>;
}
