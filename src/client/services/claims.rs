//! # Claims Service
//!
//! Patients submit claims for rewards the automatic tracking missed; staff
//! review them. Every call is a plain RPC: claim data is never substituted
//! with demo values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{RequestError, RequestService};
use crate::procedure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub status: ClaimStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ClaimStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
    pub description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    pub claim_id: Uuid,
    pub decision: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

procedure!(ListClaims, "claims", "list", ClaimQuery => Vec<Claim>);
procedure!(SubmitClaim, "claims", "submit", NewClaim => Claim);
procedure!(
    /// Staff only
    ReviewClaim, "claims", "review", ClaimReview => Claim
);

#[derive(Debug, Clone)]
pub struct ClaimsService {
    base: RequestService,
}

impl ClaimsService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn list(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, RequestError> {
        self.base.call::<ListClaims>(&ClaimQuery { status }).await
    }

    pub async fn submit(&self, claim: &NewClaim) -> Result<Claim, RequestError> {
        if claim.description.trim().is_empty() {
            return Err(RequestError::Api {
                status: 400,
                message: "Claim description is required".to_string(),
            });
        }
        self.base.call::<SubmitClaim>(claim).await
    }

    /// Approve or reject a pending claim
    pub async fn review(
        &self,
        claim_id: Uuid,
        decision: ClaimStatus,
        note: Option<String>,
    ) -> Result<Claim, RequestError> {
        if decision == ClaimStatus::Pending {
            return Err(RequestError::Api {
                status: 400,
                message: "A review must approve or reject the claim".to_string(),
            });
        }
        let claim = self
            .base
            .call::<ReviewClaim>(&ClaimReview {
                claim_id,
                decision,
                note,
            })
            .await?;
        tracing::info!(%claim_id, ?decision, "claim reviewed");
        Ok(claim)
    }
}
