//! In-memory patient profile and medical history sources.
//!
//! Stand-ins for the clinical systems that own this data. Each store is a
//! plain per-owner map with insert helpers for seeding and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use digicare_card::bundle::{
    AppointmentSummary, CappedList, ConsultationSummary, MedicalHistory, MedicalHistorySource,
    PatientProfile, PrescriptionSummary, ProfileSource,
};
use digicare_card::config::BundleLimits;
use digicare_card::error::CardResult;

/// DashMap-backed [`ProfileSource`].
#[derive(Debug, Default)]
pub struct InMemoryProfileSource {
    profiles: DashMap<Uuid, PatientProfile>,
}

impl InMemoryProfileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, owner_id: Uuid, profile: PatientProfile) {
        self.profiles.insert(owner_id, profile);
    }
}

#[async_trait]
impl ProfileSource for InMemoryProfileSource {
    async fn profile_for(&self, owner_id: Uuid) -> CardResult<Option<PatientProfile>> {
        Ok(self.profiles.get(&owner_id).map(|e| e.value().clone()))
    }
}

/// DashMap-backed [`MedicalHistorySource`]. Lists are kept newest-first; the
/// caps from [`BundleLimits`] are applied on read.
#[derive(Debug, Default)]
pub struct InMemoryHistorySource {
    appointments: DashMap<Uuid, Vec<AppointmentSummary>>,
    consultations: DashMap<Uuid, Vec<ConsultationSummary>>,
    prescriptions: DashMap<Uuid, Vec<PrescriptionSummary>>,
}

impl InMemoryHistorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_appointment(&self, owner_id: Uuid, appointment: AppointmentSummary) {
        self.appointments
            .entry(owner_id)
            .or_default()
            .push(appointment);
    }

    pub fn add_consultation(&self, owner_id: Uuid, consultation: ConsultationSummary) {
        self.consultations
            .entry(owner_id)
            .or_default()
            .push(consultation);
    }

    pub fn add_prescription(&self, owner_id: Uuid, prescription: PrescriptionSummary) {
        self.prescriptions
            .entry(owner_id)
            .or_default()
            .push(prescription);
    }
}

#[async_trait]
impl MedicalHistorySource for InMemoryHistorySource {
    async fn history_for(
        &self,
        owner_id: Uuid,
        limits: &BundleLimits,
    ) -> CardResult<MedicalHistory> {
        let appointments = self
            .appointments
            .get(&owner_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        let consultations = self
            .consultations
            .get(&owner_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        let prescriptions = self
            .prescriptions
            .get(&owner_id)
            .map(|e| e.value().clone())
            .unwrap_or_default();

        let appointments_total = appointments.len() as u64;
        let consultations_total = consultations.len() as u64;
        let prescriptions_total = prescriptions.len() as u64;

        Ok(MedicalHistory {
            appointments: CappedList::new(
                appointments,
                appointments_total,
                limits.max_appointments,
            ),
            consultations: CappedList::new(
                consultations,
                consultations_total,
                limits.max_consultations,
            ),
            prescriptions: CappedList::new(
                prescriptions,
                prescriptions_total,
                limits.max_prescriptions,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use digicare_core::CardDateTime;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_history_applies_caps_but_reports_totals() {
        let source = InMemoryHistorySource::new();
        let owner_id = Uuid::new_v4();
        for i in 0..12 {
            source.add_prescription(
                owner_id,
                PrescriptionSummary {
                    issued_at: CardDateTime::from_str("2025-04-01T08:00:00Z").unwrap(),
                    medication: format!("Medication {i}"),
                    status: "active".to_string(),
                },
            );
        }

        let limits = BundleLimits::default();
        let history = source.history_for(owner_id, &limits).await.unwrap();
        assert_eq!(history.prescriptions.items.len(), limits.max_prescriptions);
        assert_eq!(history.prescriptions.total, 12);
        assert_eq!(history.appointments.total, 0);
    }

    #[tokio::test]
    async fn test_unknown_owner_gets_empty_history() {
        let source = InMemoryHistorySource::new();
        let history = source
            .history_for(Uuid::new_v4(), &BundleLimits::default())
            .await
            .unwrap();
        assert!(history.appointments.items.is_empty());
        assert!(history.consultations.items.is_empty());
        assert!(history.prescriptions.items.is_empty());
    }
}
