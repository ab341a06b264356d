//! Owner-side card operations.
//!
//! Everything here runs behind the authenticated owner channel: issuance,
//! PIN management, token rotation and scan history. The unauthenticated scan
//! path lives in [`crate::verifier`].

use std::sync::Arc;

use time::Duration;
use uuid::Uuid;

use digicare_core::{CardDateTime, CardStatus, CardType, Clock, HealthCard, ScanLogEntry};

use crate::config::CardConfig;
use crate::error::{CardError, CardResult};
use crate::limiter::AttemptStore;
use crate::pin::{hash_pin, validate_pin, verify_pin};
use crate::qr::QrPayload;
use crate::storage::{CardStorage, ScanLogStorage};
use crate::token::{generate_access_token, generate_card_number};

/// How many times issuance or rotation retries a colliding random value
/// before giving up. Collisions are astronomically unlikely for the token;
/// the card number alphabet is small enough that retries matter.
const GENERATION_RETRIES: usize = 5;

/// Owner-facing card service.
pub struct CardService {
    cards: Arc<dyn CardStorage>,
    scan_log: Arc<dyn ScanLogStorage>,
    attempts: Arc<dyn AttemptStore>,
    config: CardConfig,
    clock: Arc<dyn Clock>,
}

/// Scan history page returned to the owner.
#[derive(Debug)]
pub struct ScanHistory {
    pub card_number: String,
    pub total_scans: u64,
    pub entries: Vec<ScanLogEntry>,
}

impl CardService {
    pub fn new(
        cards: Arc<dyn CardStorage>,
        scan_log: Arc<dyn ScanLogStorage>,
        attempts: Arc<dyn AttemptStore>,
        config: CardConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cards,
            scan_log,
            attempts,
            config,
            clock,
        }
    }

    /// Issues a new card for `owner_id`.
    ///
    /// Explicit factory: card number and access token are generated here,
    /// collision-checked against storage, with no save-triggered side
    /// effects.
    pub async fn issue_card(&self, owner_id: Uuid, card_type: CardType) -> CardResult<HealthCard> {
        let now = self.clock.now();
        let validity = Duration::seconds(self.config.validity.as_secs() as i64);

        for _ in 0..GENERATION_RETRIES {
            let card = HealthCard {
                id: Uuid::new_v4(),
                owner_id,
                card_number: generate_card_number(card_type.number_prefix()),
                card_type,
                access_token: generate_access_token(),
                pin_hash: None,
                status: CardStatus::Active,
                issued_at: CardDateTime::new(now),
                expires_at: CardDateTime::new(now + validity),
                scan_count: 0,
                last_scanned_at: None,
            };
            match self.cards.create(&card).await {
                Ok(()) => {
                    tracing::info!(card_id = %card.id, owner_id = %owner_id, "card issued");
                    return Ok(card);
                }
                Err(CardError::DuplicateCard) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(CardError::TokenGenerationExhausted)
    }

    /// Returns the owner's card.
    pub async fn my_card(&self, owner_id: Uuid) -> CardResult<HealthCard> {
        self.cards
            .find_by_owner(owner_id)
            .await?
            .ok_or(CardError::CardNotFound)
    }

    /// Sets or updates the card PIN.
    ///
    /// When a PIN is already set, `current_pin` must be supplied and verify
    /// against the stored hash before the new one is written.
    pub async fn set_pin(
        &self,
        owner_id: Uuid,
        new_pin: &str,
        current_pin: Option<&str>,
    ) -> CardResult<()> {
        let card = self.my_card(owner_id).await?;
        validate_pin(new_pin, &self.config.pin)?;

        if let Some(existing_hash) = &card.pin_hash {
            let current = current_pin.ok_or(CardError::PinVerificationFailed)?;
            if !verify_pin(current, existing_hash)? {
                return Err(CardError::PinVerificationFailed);
            }
        }

        let hash = hash_pin(new_pin)?;
        self.cards.set_pin_hash(card.id, Some(hash)).await?;
        tracing::info!(card_id = %card.id, "card PIN updated");
        Ok(())
    }

    /// Removes the card PIN after verifying it.
    pub async fn remove_pin(&self, owner_id: Uuid, pin: &str) -> CardResult<()> {
        let card = self.my_card(owner_id).await?;
        let hash = card.pin_hash.as_ref().ok_or(CardError::PinVerificationFailed)?;
        if !verify_pin(pin, hash)? {
            return Err(CardError::PinVerificationFailed);
        }
        self.cards.set_pin_hash(card.id, None).await?;
        tracing::info!(card_id = %card.id, "card PIN removed");
        Ok(())
    }

    /// Rotates the access token and rebuilds the QR payload.
    ///
    /// The old token stops resolving the instant the swap lands, and its
    /// attempt counters are discarded with it.
    pub async fn rotate_token(&self, owner_id: Uuid) -> CardResult<(HealthCard, QrPayload)> {
        let card = self.my_card(owner_id).await?;
        let old_token = card.access_token.clone();

        for _ in 0..GENERATION_RETRIES {
            let new_token = generate_access_token();
            if self.cards.rotate_token(card.id, &new_token).await? {
                self.attempts.discard_token(&old_token).await?;
                let rotated = self
                    .cards
                    .find_by_id(card.id)
                    .await?
                    .ok_or(CardError::CardNotFound)?;
                tracing::info!(card_id = %card.id, "access token rotated");
                let payload = QrPayload::for_card(&rotated);
                return Ok((rotated, payload));
            }
        }
        Err(CardError::TokenGenerationExhausted)
    }

    /// Most recent scan attempts against the owner's card, plus the
    /// all-time total.
    pub async fn scan_history(&self, owner_id: Uuid, limit: usize) -> CardResult<ScanHistory> {
        let card = self.my_card(owner_id).await?;
        let entries = self.scan_log.recent_for(card.id, limit).await?;
        let total_scans = self.scan_log.total_for(card.id).await?;
        Ok(ScanHistory {
            card_number: card.card_number,
            total_scans,
            entries,
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
