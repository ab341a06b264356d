//! In-memory backend wiring.
//!
//! The default deployment runs entirely on the DashMap stores; persistent
//! backends plug in at the same trait seams. The concrete store handles stay
//! accessible so that seeding (demo data, test fixtures, session injection)
//! can bypass the HTTP surface.

use std::sync::Arc;

use digicare_card::bundle::BundleAssembler;
use digicare_card::config::CardConfig;
use digicare_card::service::CardService;
use digicare_card::verifier::ScanVerifier;
use digicare_core::Clock;
use digicare_db_memory::{
    InMemoryAttemptStore, InMemoryCardStorage, InMemoryHistorySource, InMemoryProfileSource,
    InMemoryScanLogStorage, InMemorySessionStorage,
};
use digicare_notifications::NotificationDispatch;

use crate::server::AppState;

/// Handles to every in-memory store backing one server instance.
pub struct InMemoryBackend {
    pub cards: Arc<InMemoryCardStorage>,
    pub attempts: Arc<InMemoryAttemptStore>,
    pub scan_log: Arc<InMemoryScanLogStorage>,
    pub sessions: Arc<InMemorySessionStorage>,
    pub profiles: Arc<InMemoryProfileSource>,
    pub history: Arc<InMemoryHistorySource>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            cards: Arc::new(InMemoryCardStorage::new()),
            attempts: Arc::new(InMemoryAttemptStore::new()),
            scan_log: Arc::new(InMemoryScanLogStorage::new()),
            sessions: Arc::new(InMemorySessionStorage::new()),
            profiles: Arc::new(InMemoryProfileSource::new()),
            history: Arc::new(InMemoryHistorySource::new()),
        }
    }

    /// Wires the handler state over this backend.
    pub fn state(
        &self,
        config: CardConfig,
        clock: Arc<dyn Clock>,
        notifications: Arc<dyn NotificationDispatch>,
    ) -> AppState {
        let assembler = Arc::new(BundleAssembler::new(
            self.profiles.clone(),
            self.history.clone(),
            config.bundle.clone(),
        ));
        let service = Arc::new(CardService::new(
            self.cards.clone(),
            self.scan_log.clone(),
            self.attempts.clone(),
            config.clone(),
            clock.clone(),
        ));
        let verifier = Arc::new(ScanVerifier::new(
            self.cards.clone(),
            self.attempts.clone(),
            self.scan_log.clone(),
            notifications,
            assembler.clone(),
            config,
            clock,
        ));
        AppState {
            service,
            verifier,
            sessions: self.sessions.clone(),
            assembler,
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}
