//! Profile of the signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{RequestError, RequestService};
use crate::procedure;

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Provider,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields a user may change; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

procedure!(GetProfile, "user", "getProfile", () => UserProfile);
procedure!(UpdateProfile, "user", "updateProfile", ProfileUpdate => UserProfile);

#[derive(Debug, Clone)]
pub struct UserService {
    base: RequestService,
}

impl UserService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn get_profile(&self) -> Result<UserProfile, RequestError> {
        self.base.call::<GetProfile>(&()).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, RequestError> {
        self.base.call::<UpdateProfile>(update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::services::demo;
    use crate::client::services::testing::{base, StubTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let transport = StubTransport::new();
        let profile = demo::user_profile();
        transport.respond("user", "updateProfile", serde_json::to_value(&profile).unwrap());
        let service = UserService::new(base(&transport));

        let update = ProfileUpdate {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let updated = service.update_profile(&update).await.unwrap();

        assert_eq!(updated, profile);
        assert_eq!(transport.calls()[0].1, json!({"name": "Ada"}));
    }

    #[test]
    fn test_profile_wire_format() {
        let value = json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "email": "pat@example.com",
            "name": "Pat",
            "role": "patient",
            "createdAt": "2025-01-01T00:00:00Z"
        });
        let profile: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(profile.role, Role::Patient);
        assert!(profile.wallet_address.is_none());
    }
}
