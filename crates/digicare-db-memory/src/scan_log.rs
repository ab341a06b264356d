//! In-memory scan audit log.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use digicare_card::error::CardResult;
use digicare_card::storage::ScanLogStorage;
use digicare_core::ScanLogEntry;

/// Append-only per-card entry lists. Entries are stored in arrival order and
/// reversed on read so `recent_for` is most-recent-first.
#[derive(Debug, Default)]
pub struct InMemoryScanLogStorage {
    entries: DashMap<Uuid, Vec<ScanLogEntry>>,
}

impl InMemoryScanLogStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanLogStorage for InMemoryScanLogStorage {
    async fn record(&self, entry: &ScanLogEntry) -> CardResult<()> {
        self.entries
            .entry(entry.card_id)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn recent_for(&self, card_id: Uuid, limit: usize) -> CardResult<Vec<ScanLogEntry>> {
        let Some(entries) = self.entries.get(&card_id) else {
            return Ok(Vec::new());
        };
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }

    async fn total_for(&self, card_id: Uuid) -> CardResult<u64> {
        Ok(self
            .entries
            .get(&card_id)
            .map(|e| e.len() as u64)
            .unwrap_or(0))
    }
}
