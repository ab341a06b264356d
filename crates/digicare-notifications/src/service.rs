use async_trait::async_trait;

use crate::error::NotificationError;
use crate::types::ScanAlert;

/// Fire-and-forget owner notification channel.
///
/// The verifier dispatches on a spawned task with its own short timeout;
/// implementations may block on their transport but must never be awaited on
/// the scan response path.
#[async_trait]
pub trait NotificationDispatch: Send + Sync {
    /// Deliver a scan alert to the card owner.
    async fn card_scanned(&self, alert: ScanAlert) -> Result<(), NotificationError>;
}
