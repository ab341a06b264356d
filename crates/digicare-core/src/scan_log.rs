//! Append-only scan audit facts.
//!
//! One [`ScanLogEntry`] is written per terminal scan outcome that resolved a
//! card. Entries are never mutated or deleted by this subsystem; retention is
//! an external concern.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::CardDateTime;

/// Terminal outcome of a scan attempt against a resolved card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Records were released.
    Success,
    /// The attempt was denied.
    Denied,
    /// Neutral discovery event: the card asked for a PIN and none was
    /// supplied. Not a credential failure.
    Discovery,
}

/// Why a scan attempt was denied, as recorded in the audit trail. The
/// public response never carries these codes; they exist for the owner's
/// scan history and operational review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFailureReason {
    /// Card was not Active, or was past its expiry.
    InvalidCardState,
    /// Token was under an active PIN lockout.
    Locked,
    /// A PIN was supplied and did not verify.
    InvalidPin,
    /// Card requires a PIN and none was supplied. Only ever recorded on
    /// [`ScanOutcome::Discovery`] entries.
    PinRequired,
}

/// One scan attempt against a resolved card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanLogEntry {
    pub card_id: Uuid,
    pub scanned_at: CardDateTime,
    pub source_ip: String,
    pub user_agent: String,
    pub outcome: ScanOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ScanFailureReason>,
}

impl ScanLogEntry {
    pub fn success(
        card_id: Uuid,
        scanned_at: CardDateTime,
        source_ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            card_id,
            scanned_at,
            source_ip: source_ip.into(),
            user_agent: user_agent.into(),
            outcome: ScanOutcome::Success,
            reason: None,
        }
    }

    pub fn denied(
        card_id: Uuid,
        scanned_at: CardDateTime,
        source_ip: impl Into<String>,
        user_agent: impl Into<String>,
        reason: ScanFailureReason,
    ) -> Self {
        Self {
            card_id,
            scanned_at,
            source_ip: source_ip.into(),
            user_agent: user_agent.into(),
            outcome: ScanOutcome::Denied,
            reason: Some(reason),
        }
    }

    /// Records a PIN discovery response. Kept out of the denied count so
    /// owner history never mistakes a bare first scan for a failed attempt.
    pub fn discovery(
        card_id: Uuid,
        scanned_at: CardDateTime,
        source_ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            card_id,
            scanned_at,
            source_ip: source_ip.into(),
            user_agent: user_agent.into(),
            outcome: ScanOutcome::Discovery,
            reason: Some(ScanFailureReason::PinRequired),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.outcome == ScanOutcome::Success
    }
}
