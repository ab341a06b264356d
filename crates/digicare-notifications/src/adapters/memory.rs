use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::NotificationError;
use crate::service::NotificationDispatch;
use crate::types::ScanAlert;

/// Records every alert in memory. Used by tests to assert that successful
/// scans notify the owner and denied scans do not.
#[derive(Debug, Default)]
pub struct RecordingDispatch {
    alerts: Mutex<Vec<ScanAlert>>,
}

impl RecordingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<ScanAlert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationDispatch for RecordingDispatch {
    async fn card_scanned(&self, alert: ScanAlert) -> Result<(), NotificationError> {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alert);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digicare_core::CardDateTime;
    use std::str::FromStr;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_recording_dispatch_collects_alerts() {
        let dispatch = RecordingDispatch::new();
        assert!(dispatch.is_empty());
        dispatch
            .card_scanned(ScanAlert {
                owner_id: Uuid::new_v4(),
                card_number: "SMART-AB23-CD45".to_string(),
                scanned_at: CardDateTime::from_str("2025-06-01T10:00:00Z").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(dispatch.len(), 1);
        assert_eq!(dispatch.alerts()[0].card_number, "SMART-AB23-CD45");
    }
}
