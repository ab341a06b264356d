//! Scan audit log storage trait.
//!
//! The log is append-only from this subsystem's point of view; entries are
//! never mutated or deleted here. Retention and purging are external
//! concerns.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CardResult;
use digicare_core::ScanLogEntry;

/// Storage trait for scan audit entries.
#[async_trait]
pub trait ScanLogStorage: Send + Sync {
    /// Appends one entry.
    ///
    /// The verifier treats failures here as operational events only; a scan
    /// is never failed or delayed because its audit write failed.
    async fn record(&self, entry: &ScanLogEntry) -> CardResult<()>;

    /// Returns up to `limit` entries for the card, most recent first. Each
    /// call is a fresh query.
    async fn recent_for(&self, card_id: Uuid, limit: usize) -> CardResult<Vec<ScanLogEntry>>;

    /// Returns the all-time entry count for the card, independent of any
    /// `limit` applied to [`Self::recent_for`].
    async fn total_for(&self, card_id: Uuid) -> CardResult<u64>;
}
