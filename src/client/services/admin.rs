//! Staff-side patient management and platform analytics.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

const ANALYTICS_TIMEOUT: Duration = Duration::from_millis(2000);

/// One row of a patient listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Share of scheduled doses taken, 0.0..=1.0
    pub adherence_rate: f64,
    pub token_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for PatientQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAnalytics {
    pub total_patients: u64,
    pub active_patients: u64,
    pub average_adherence: f64,
    pub tokens_distributed: f64,
    pub claims_pending: u64,
}

procedure!(ListPatients, "admin", "listPatients", PatientQuery => Vec<PatientSummary>);
procedure!(GetAnalytics, "admin", "getAnalytics", () => PlatformAnalytics);

#[derive(Debug, Clone)]
pub struct AdminService {
    base: RequestService,
}

impl AdminService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn list_patients(&self, query: &PatientQuery) -> Result<Vec<PatientSummary>, RequestError> {
        self.base.call::<ListPatients>(query).await
    }

    /// Dashboard analytics, demo figures when the server is slow
    pub async fn analytics(&self) -> Sourced<PlatformAnalytics> {
        let base = self.base.clone();
        with_fallback(
            async move { base.call::<GetAnalytics>(&()).await },
            ANALYTICS_TIMEOUT,
            demo::platform_analytics,
        )
        .await
    }
}
