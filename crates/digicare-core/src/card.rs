//! Health card domain types.
//!
//! A [`HealthCard`] is one issued credential: an opaque external id, a
//! display-only card number, a rotatable high-entropy access token and an
//! optional hashed PIN. The access token is the sole lookup key on the public
//! scan path; the card number is never used for lookup.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::time::CardDateTime;

/// Card lifecycle state. Only `Active` cards may be scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Suspended,
    Revoked,
    Expired,
}

impl CardStatus {
    pub fn display(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Revoked => "Revoked",
            Self::Expired => "Expired",
        }
    }
}

/// Kind of card issued to the patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Smart health card issued by this system.
    Smart,
    /// Card linked to the national insurance scheme.
    Nhis,
    /// Smart card with a verified national insurance link.
    Hybrid,
}

impl CardType {
    pub fn display(&self) -> &'static str {
        match self {
            Self::Smart => "Smart Health Card",
            Self::Nhis => "NHIS Card (Linked)",
            Self::Hybrid => "Smart Card with NHIS Link",
        }
    }

    /// Prefix used when generating the human-readable card number.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            Self::Smart => "SMART",
            Self::Nhis => "NHIS",
            Self::Hybrid => "HYBRID",
        }
    }
}

/// One issued health credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCard {
    /// Opaque external id, never guessable from card data.
    pub id: Uuid,

    /// Owning patient identity.
    pub owner_id: Uuid,

    /// Human-readable number (e.g. `SMART-XXXX-XXXX`), display only.
    pub card_number: String,

    pub card_type: CardType,

    /// High-entropy bearer token embedded in the QR code. Unique across all
    /// cards; rotation replaces it atomically.
    pub access_token: String,

    /// Argon2id PHC hash of the optional PIN. `None` means no PIN is
    /// required; presence of the hash is the only "has PIN" signal.
    pub pin_hash: Option<String>,

    pub status: CardStatus,

    pub issued_at: CardDateTime,
    pub expires_at: CardDateTime,

    /// Mutated only by successful scans.
    pub scan_count: u64,
    pub last_scanned_at: Option<CardDateTime>,
}

impl HealthCard {
    pub fn has_pin(&self) -> bool {
        self.pin_hash.is_some()
    }

    /// Expiry is checked against the request time, independent of `status`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        *self.expires_at.inner() < now
    }

    /// A card is scannable only while `Active` and unexpired.
    pub fn is_scannable(&self, now: OffsetDateTime) -> bool {
        self.status == CardStatus::Active && !self.is_expired(now)
    }

    /// Whole days until expiry, clamped at zero for expired cards.
    pub fn days_until_expiry(&self, now: OffsetDateTime) -> i64 {
        let remaining = *self.expires_at.inner() - now;
        remaining.whole_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::CardDateTime;
    use time::macros::datetime;

    fn card(status: CardStatus, expires_at: OffsetDateTime) -> HealthCard {
        HealthCard {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            card_number: "SMART-AB23-CD45".to_string(),
            card_type: CardType::Smart,
            access_token: "hc_test".to_string(),
            pin_hash: None,
            status,
            issued_at: CardDateTime::new(datetime!(2025-01-01 00:00:00 UTC)),
            expires_at: CardDateTime::new(expires_at),
            scan_count: 0,
            last_scanned_at: None,
        }
    }

    #[test]
    fn test_active_unexpired_is_scannable() {
        let now = datetime!(2025-06-01 00:00:00 UTC);
        let c = card(CardStatus::Active, datetime!(2026-01-01 00:00:00 UTC));
        assert!(c.is_scannable(now));
    }

    #[test]
    fn test_expired_card_not_scannable_even_when_active() {
        let now = datetime!(2025-06-01 00:00:00 UTC);
        let c = card(CardStatus::Active, datetime!(2025-05-01 00:00:00 UTC));
        assert!(c.is_expired(now));
        assert!(!c.is_scannable(now));
    }

    #[test]
    fn test_suspended_card_not_scannable() {
        let now = datetime!(2025-06-01 00:00:00 UTC);
        let c = card(CardStatus::Suspended, datetime!(2026-01-01 00:00:00 UTC));
        assert!(!c.is_scannable(now));
    }

    #[test]
    fn test_days_until_expiry_clamped() {
        let now = datetime!(2025-06-01 00:00:00 UTC);
        let c = card(CardStatus::Active, datetime!(2025-06-11 00:00:00 UTC));
        assert_eq!(c.days_until_expiry(now), 10);

        let expired = card(CardStatus::Active, datetime!(2025-05-01 00:00:00 UTC));
        assert_eq!(expired.days_until_expiry(now), 0);
    }

    #[test]
    fn test_has_pin_follows_hash_presence() {
        let mut c = card(CardStatus::Active, datetime!(2026-01-01 00:00:00 UTC));
        assert!(!c.has_pin());
        c.pin_hash = Some("$argon2id$stub".to_string());
        assert!(c.has_pin());
    }

    #[test]
    fn test_card_type_prefixes() {
        assert_eq!(CardType::Smart.number_prefix(), "SMART");
        assert_eq!(CardType::Nhis.number_prefix(), "NHIS");
        assert_eq!(CardType::Hybrid.number_prefix(), "HYBRID");
    }
}
