use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{RequestError, RequestService};
use crate::client::services::admin::PatientSummary;
use crate::procedure;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceReport {
    pub patient_id: Uuid,
    pub rate: f64,
    pub streak_days: u32,
    pub missed_doses: u32,
}

procedure!(AssignedPatients, "provider", "getAssignedPatients", () => Vec<PatientSummary>);
procedure!(PatientAdherence, "provider", "getPatientAdherence", PatientRef => AdherenceReport);

/// Provider view of assigned patients
#[derive(Debug, Clone)]
pub struct ProviderService {
    base: RequestService,
}

impl ProviderService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn assigned_patients(&self) -> Result<Vec<PatientSummary>, RequestError> {
        self.base.call::<AssignedPatients>(&()).await
    }

    pub async fn patient_adherence(&self, patient_id: Uuid) -> Result<AdherenceReport, RequestError> {
        self.base.call::<PatientAdherence>(&PatientRef { patient_id }).await
    }
}
