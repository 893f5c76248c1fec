//! Vitals and health metrics.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

const METRICS_TIMEOUT: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodPressure {
    pub systolic: u32,
    pub diastolic: u32,
}

/// Latest readings; any field may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    #[serde(default)]
    pub heart_rate: Option<u32>,
    #[serde(default)]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// A new set of readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
}

impl VitalsInput {
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.blood_pressure.is_none()
            && self.weight_kg.is_none()
            && self.steps.is_none()
    }
}

procedure!(GetMetrics, "health", "getMetrics", () => HealthMetrics);
procedure!(RecordVitals, "health", "recordVitals", VitalsInput => HealthMetrics);

#[derive(Debug, Clone)]
pub struct HealthService {
    base: RequestService,
}

impl HealthService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn metrics(&self) -> Sourced<HealthMetrics> {
        let base = self.base.clone();
        with_fallback(
            async move { base.call::<GetMetrics>(&()).await },
            METRICS_TIMEOUT,
            demo::health_metrics,
        )
        .await
    }

    pub async fn record_vitals(&self, vitals: &VitalsInput) -> Result<HealthMetrics, RequestError> {
        if vitals.is_empty() {
            return Err(RequestError::Api {
                status: 400,
                message: "At least one reading is required".to_string(),
            });
        }
        self.base.call::<RecordVitals>(vitals).await
    }
}
