//! QR payload construction.
//!
//! The QR code carries a compact JSON payload whose only secret is the
//! access token. Rendering the payload into an image is an external
//! collaborator behind [`QrRenderer`].

use serde::{Deserialize, Serialize};

use digicare_core::{CardType, HealthCard};

use crate::error::CardResult;

/// Payload format version.
pub const QR_PAYLOAD_VERSION: u8 = 2;

/// Compact payload embedded in the scannable QR image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrPayload {
    pub v: u8,
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub token: String,
}

impl QrPayload {
    pub fn for_card(card: &HealthCard) -> Self {
        Self {
            v: QR_PAYLOAD_VERSION,
            card_type: card.card_type,
            token: card.access_token.clone(),
        }
    }

    /// Compact JSON encoding, no insignificant whitespace.
    pub fn encode(&self) -> CardResult<String> {
        serde_json::to_string(self).map_err(|e| crate::error::CardError::internal(e.to_string()))
    }
}

/// Renders a QR payload into a scannable image. Image generation and hosting
/// are out of scope; the server wires in whatever renderer the deployment
/// provides.
pub trait QrRenderer: Send + Sync {
    /// Returns a URL or data reference to the rendered image.
    fn render(&self, payload: &str) -> CardResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use digicare_core::{CardDateTime, CardStatus};
    use std::str::FromStr;
    use uuid::Uuid;

    fn card() -> HealthCard {
        HealthCard {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            card_number: "SMART-AB23-CD45".to_string(),
            card_type: CardType::Smart,
            access_token: "hc_deadbeef".to_string(),
            pin_hash: None,
            status: CardStatus::Active,
            issued_at: CardDateTime::from_str("2025-01-01T00:00:00Z").unwrap(),
            expires_at: CardDateTime::from_str("2026-01-01T00:00:00Z").unwrap(),
            scan_count: 0,
            last_scanned_at: None,
        }
    }

    #[test]
    fn test_payload_encoding_is_compact() {
        let payload = QrPayload::for_card(&card());
        let encoded = payload.encode().unwrap();
        assert_eq!(encoded, r#"{"v":2,"type":"smart","token":"hc_deadbeef"}"#);
    }

    #[test]
    fn test_payload_roundtrip() {
        let payload = QrPayload::for_card(&card());
        let decoded: QrPayload = serde_json::from_str(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }
}
