//! In-memory card storage backed by DashMap.
//!
//! Two maps: the card table keyed by external id, and a token index keyed by
//! access token. Rotation serializes on the card's table entry, so no
//! request ever observes both the old and the new token as valid; the
//! instant between removing the old index entry and inserting the new one
//! resolves neither, which is the permitted swap instant.
//!
//! Token index operations never overlap: the old and new token can land in
//! the same DashMap shard, and holding a guard for one while touching the
//! other re-enters the shard's non-reentrant lock.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

use digicare_card::error::{CardError, CardResult};
use digicare_card::storage::CardStorage;
use digicare_core::{CardDateTime, HealthCard};

/// DashMap-backed implementation of [`CardStorage`].
#[derive(Debug, Default)]
pub struct InMemoryCardStorage {
    cards: Arc<DashMap<Uuid, HealthCard>>,
    token_index: Arc<DashMap<String, Uuid>>,
    owner_index: Arc<DashMap<Uuid, Uuid>>,
}

impl InMemoryCardStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStorage for InMemoryCardStorage {
    async fn create(&self, card: &HealthCard) -> CardResult<()> {
        // Reserve the token first; it is the uniqueness-critical field.
        match self.token_index.entry(card.access_token.clone()) {
            dashmap::Entry::Occupied(_) => return Err(CardError::DuplicateCard),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(card.id);
            }
        }
        if self
            .cards
            .iter()
            .any(|existing| existing.card_number == card.card_number)
        {
            self.token_index.remove(&card.access_token);
            return Err(CardError::DuplicateCard);
        }
        self.owner_index.insert(card.owner_id, card.id);
        self.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn find_by_token(&self, access_token: &str) -> CardResult<Option<HealthCard>> {
        let Some(card_id) = self.token_index.get(access_token).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.cards.get(&card_id).map(|e| e.value().clone()))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> CardResult<Option<HealthCard>> {
        let Some(card_id) = self.owner_index.get(&owner_id).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.cards.get(&card_id).map(|e| e.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> CardResult<Option<HealthCard>> {
        Ok(self.cards.get(&id).map(|e| e.value().clone()))
    }

    async fn rotate_token(&self, card_id: Uuid, new_token: &str) -> CardResult<bool> {
        // Holding the card's entry lock serializes rotations per card.
        let Some(mut card) = self.cards.get_mut(&card_id) else {
            return Err(CardError::CardNotFound);
        };

        // Three non-overlapping index steps; each acquires and releases its
        // shard lock before the next runs.
        if self.token_index.contains_key(new_token) {
            return Ok(false);
        }
        self.token_index.remove(&card.access_token);
        self.token_index.insert(new_token.to_string(), card_id);
        card.access_token = new_token.to_string();
        Ok(true)
    }

    async fn set_pin_hash(&self, card_id: Uuid, pin_hash: Option<String>) -> CardResult<()> {
        let Some(mut card) = self.cards.get_mut(&card_id) else {
            return Err(CardError::CardNotFound);
        };
        card.pin_hash = pin_hash;
        Ok(())
    }

    async fn record_scan(&self, card_id: Uuid, scanned_at: OffsetDateTime) -> CardResult<()> {
        let Some(mut card) = self.cards.get_mut(&card_id) else {
            return Err(CardError::CardNotFound);
        };
        card.scan_count += 1;
        card.last_scanned_at = Some(CardDateTime::new(scanned_at));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digicare_core::{CardStatus, CardType};
    use std::str::FromStr;

    fn card(token: &str, number: &str) -> HealthCard {
        HealthCard {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            card_number: number.to_string(),
            card_type: CardType::Smart,
            access_token: token.to_string(),
            pin_hash: None,
            status: CardStatus::Active,
            issued_at: CardDateTime::from_str("2025-01-01T00:00:00Z").unwrap(),
            expires_at: CardDateTime::from_str("2026-01-01T00:00:00Z").unwrap(),
            scan_count: 0,
            last_scanned_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve_by_token() {
        let store = InMemoryCardStorage::new();
        let c = card("hc_aaa", "SMART-AB23-CD45");
        store.create(&c).await.unwrap();

        let found = store.find_by_token("hc_aaa").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);
        assert!(store.find_by_token("hc_bbb").await.unwrap().is_none());
        // No prefix matching.
        assert!(store.find_by_token("hc_aa").await.unwrap().is_none());
        // Card number never resolves on the token path.
        assert!(
            store
                .find_by_token("SMART-AB23-CD45")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_token() {
        let store = InMemoryCardStorage::new();
        store.create(&card("hc_aaa", "SMART-AB23-CD45")).await.unwrap();
        let dup = card("hc_aaa", "SMART-EF67-GH89");
        assert!(matches!(
            store.create(&dup).await,
            Err(CardError::DuplicateCard)
        ));
    }

    #[tokio::test]
    async fn test_rotate_swaps_resolution_atomically() {
        let store = InMemoryCardStorage::new();
        let c = card("hc_old", "SMART-AB23-CD45");
        store.create(&c).await.unwrap();

        assert!(store.rotate_token(c.id, "hc_new").await.unwrap());
        assert!(store.find_by_token("hc_old").await.unwrap().is_none());
        let found = store.find_by_token("hc_new").await.unwrap().unwrap();
        assert_eq!(found.id, c.id);
    }

    #[tokio::test]
    async fn test_rotate_reports_collision() {
        let store = InMemoryCardStorage::new();
        let a = card("hc_a", "SMART-AB23-CD45");
        let b = card("hc_b", "SMART-EF67-GH89");
        store.create(&a).await.unwrap();
        store.create(&b).await.unwrap();

        // Colliding with b's live token leaves a untouched.
        assert!(!store.rotate_token(a.id, "hc_b").await.unwrap());
        assert_eq!(
            store.find_by_token("hc_a").await.unwrap().unwrap().id,
            a.id
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_repeated_rotations_never_stall() {
        // Rotations whose old and new tokens fall into the same index shard
        // must not block; enough iterations guarantee shard collisions.
        let store = std::sync::Arc::new(InMemoryCardStorage::new());
        let c = card("hc_seed", "SMART-AB23-CD45");
        store.create(&c).await.unwrap();

        let rotations = {
            let store = std::sync::Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..2_000u32 {
                    let token = format!("hc_{i:064x}");
                    assert!(store.rotate_token(c.id, &token).await.unwrap());
                }
            })
        };
        tokio::time::timeout(std::time::Duration::from_secs(30), rotations)
            .await
            .expect("rotation loop stalled")
            .unwrap();

        let last = format!("hc_{:064x}", 1_999u32);
        assert_eq!(store.find_by_token(&last).await.unwrap().unwrap().id, c.id);
    }

    #[tokio::test]
    async fn test_record_scan_updates_count_and_timestamp() {
        let store = InMemoryCardStorage::new();
        let c = card("hc_aaa", "SMART-AB23-CD45");
        store.create(&c).await.unwrap();

        let now = OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap();
        store.record_scan(c.id, now).await.unwrap();
        store.record_scan(c.id, now).await.unwrap();

        let found = store.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(found.scan_count, 2);
        assert_eq!(found.last_scanned_at, Some(CardDateTime::new(now)));
    }
}
