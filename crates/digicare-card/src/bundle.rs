//! Record bundle assembly.
//!
//! On a successful scan the verifier returns an aggregated view of the
//! patient: card metadata, a profile summary and a medical history section.
//! Domain data lives behind [`ProfileSource`] and [`MedicalHistorySource`];
//! the business systems that produce it are external collaborators.
//!
//! The public scan path never receives medical history detail: the section
//! is replaced with a neutral placeholder. The authenticated owner download
//! gets the unredacted bundle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::BundleLimits;
use crate::error::{CardError, CardResult};
use digicare_core::{CardDateTime, HealthCard};

/// Trust level of the caller the bundle is assembled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleAudience {
    /// Unauthenticated scan path; medical detail is redacted.
    PublicScan,
    /// Authenticated card owner; nothing is redacted.
    Owner,
}

/// Emergency contact attached to a patient profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

/// Patient profile, selected once at lookup time. The role determines which
/// summary fields are surfaced; there is no runtime attribute probing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum PatientProfile {
    Student {
        full_name: String,
        institution: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        emergency_contact: Option<EmergencyContact>,
    },
    Adult {
        full_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        occupation: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        emergency_contact: Option<EmergencyContact>,
    },
    Visitor {
        full_name: String,
        home_country: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        emergency_contact: Option<EmergencyContact>,
    },
}

impl PatientProfile {
    /// Role-specific one-line summary for display next to the card.
    pub fn summary(&self) -> ProfileSummary {
        match self {
            Self::Student {
                full_name,
                institution,
                ..
            } => ProfileSummary {
                full_name: full_name.clone(),
                role: "student".to_string(),
                affiliation: Some(institution.clone()),
            },
            Self::Adult {
                full_name,
                occupation,
                ..
            } => ProfileSummary {
                full_name: full_name.clone(),
                role: "adult".to_string(),
                affiliation: occupation.clone(),
            },
            Self::Visitor {
                full_name,
                home_country,
                ..
            } => ProfileSummary {
                full_name: full_name.clone(),
                role: "visitor".to_string(),
                affiliation: Some(home_country.clone()),
            },
        }
    }

    pub fn emergency_contact(&self) -> Option<&EmergencyContact> {
        match self {
            Self::Student {
                emergency_contact, ..
            }
            | Self::Adult {
                emergency_contact, ..
            }
            | Self::Visitor {
                emergency_contact, ..
            } => emergency_contact.as_ref(),
        }
    }
}

/// Flattened profile view included in every bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

/// Detail list truncated to a configured cap; `total` always reflects the
/// untruncated count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CappedList<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> CappedList<T> {
    pub fn new(mut items: Vec<T>, total: u64, cap: usize) -> Self {
        items.truncate(cap);
        Self { items, total }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub scheduled_at: CardDateTime,
    pub facility: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationSummary {
    pub held_at: CardDateTime,
    pub practitioner: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionSummary {
    pub issued_at: CardDateTime,
    pub medication: String,
    pub status: String,
}

/// Medical history detail with per-category caps and all-time totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub appointments: CappedList<AppointmentSummary>,
    pub consultations: CappedList<ConsultationSummary>,
    pub prescriptions: CappedList<PrescriptionSummary>,
}

/// Medical history section of a bundle: full detail for the owner, a
/// placeholder for the public scan path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MedicalHistorySection {
    Full(MedicalHistory),
    Redacted { note: String },
}

/// Card metadata echoed in the bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardInfo {
    pub card_number: String,
    pub card_type: String,
    pub status: String,
    pub issued_at: CardDateTime,
    pub expires_at: CardDateTime,
}

/// Aggregated view returned on a successful scan or owner download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBundle {
    pub card_info: CardInfo,
    pub patient_profile: ProfileSummary,
    pub medical_history: MedicalHistorySection,
}

/// Produces the patient profile for a card owner.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn profile_for(&self, owner_id: Uuid) -> CardResult<Option<PatientProfile>>;
}

/// Produces capped medical history lists with all-time totals.
#[async_trait]
pub trait MedicalHistorySource: Send + Sync {
    async fn history_for(&self, owner_id: Uuid, limits: &BundleLimits)
    -> CardResult<MedicalHistory>;
}

/// Composes card metadata, profile and history into a [`RecordBundle`].
pub struct BundleAssembler {
    profiles: Arc<dyn ProfileSource>,
    history: Arc<dyn MedicalHistorySource>,
    limits: BundleLimits,
}

impl BundleAssembler {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        history: Arc<dyn MedicalHistorySource>,
        limits: BundleLimits,
    ) -> Self {
        Self {
            profiles,
            history,
            limits,
        }
    }

    /// Assembles the bundle for `card`, redacting medical detail unless the
    /// audience is the authenticated owner.
    pub async fn assemble(
        &self,
        card: &HealthCard,
        audience: BundleAudience,
    ) -> CardResult<RecordBundle> {
        let profile = self
            .profiles
            .profile_for(card.owner_id)
            .await?
            .ok_or(CardError::CardNotFound)?;

        let medical_history = match audience {
            BundleAudience::Owner => {
                MedicalHistorySection::Full(self.history.history_for(card.owner_id, &self.limits).await?)
            }
            BundleAudience::PublicScan => MedicalHistorySection::Redacted {
                note: "Medical records require authentication".to_string(),
            },
        };

        Ok(RecordBundle {
            card_info: CardInfo {
                card_number: card.card_number.clone(),
                card_type: card.card_type.display().to_string(),
                status: card.status.display().to_string(),
                issued_at: card.issued_at,
                expires_at: card.expires_at,
            },
            patient_profile: profile.summary(),
            medical_history,
        })
    }
}
