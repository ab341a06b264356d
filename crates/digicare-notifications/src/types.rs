use serde::{Deserialize, Serialize};
use uuid::Uuid;

use digicare_core::CardDateTime;

/// Alert sent to a card owner after their card was scanned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAlert {
    pub owner_id: Uuid,
    pub card_number: String,
    pub scanned_at: CardDateTime,
}

impl ScanAlert {
    /// Owner-facing alert text.
    pub fn message(&self) -> String {
        format!(
            "Your health card '{}' was just scanned at {}. \
             If this wasn't you, please secure your account immediately.",
            self.card_number, self.scanned_at
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_message_names_card_and_time() {
        let alert = ScanAlert {
            owner_id: Uuid::new_v4(),
            card_number: "SMART-AB23-CD45".to_string(),
            scanned_at: CardDateTime::from_str("2025-06-01T10:00:00Z").unwrap(),
        };
        let message = alert.message();
        assert!(message.contains("SMART-AB23-CD45"));
        assert!(message.contains("2025-06-01T10:00:00Z"));
    }
}
