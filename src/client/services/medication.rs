use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{RequestError, RequestService};
use crate::procedure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    /// Scheduled times of day, "HH:MM"
    #[serde(default)]
    pub schedule: Vec<String>,
    pub adherence_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseLog {
    pub medication_id: Uuid,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoseRecord {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub taken_at: DateTime<Utc>,
    /// Tokens earned for an on-time dose
    #[serde(default)]
    pub reward: f64,
}

procedure!(ListMedications, "medication", "list", () => Vec<Medication>);
procedure!(LogDose, "medication", "logDose", DoseLog => DoseRecord);

/// Medication schedule and dose logging
#[derive(Debug, Clone)]
pub struct MedicationService {
    base: RequestService,
}

impl MedicationService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn list(&self) -> Result<Vec<Medication>, RequestError> {
        self.base.call::<ListMedications>(&()).await
    }

    /// Log a dose taken now
    pub async fn log_dose(&self, medication_id: Uuid) -> Result<DoseRecord, RequestError> {
        self.log_dose_at(medication_id, Utc::now()).await
    }

    pub async fn log_dose_at(
        &self,
        medication_id: Uuid,
        taken_at: DateTime<Utc>,
    ) -> Result<DoseRecord, RequestError> {
        let record = self
            .base
            .call::<LogDose>(&DoseLog {
                medication_id,
                taken_at,
            })
            .await?;
        tracing::debug!(%medication_id, reward = record.reward, "dose logged");
        Ok(record)
    }
}
