use async_trait::async_trait;

use crate::error::NotificationError;
use crate::service::NotificationDispatch;
use crate::types::ScanAlert;

/// Tracing-backed adapter. Default wiring until a real transport (email,
/// SMS, push) is configured for the deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatch;

#[async_trait]
impl NotificationDispatch for LogDispatch {
    async fn card_scanned(&self, alert: ScanAlert) -> Result<(), NotificationError> {
        tracing::info!(
            owner_id = %alert.owner_id,
            card_number = %alert.card_number,
            scanned_at = %alert.scanned_at,
            "owner scan alert"
        );
        Ok(())
    }
}
