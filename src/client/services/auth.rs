//! Session procedures. Credentials are only forwarded; the server owns the
//! authentication flow.

use serde::{Deserialize, Serialize};

use crate::client::request::{RequestError, RequestService};
use crate::client::services::user::UserProfile;
use crate::procedure;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: UserProfile,
}

procedure!(Login, "auth", "login", Credentials => AuthSession);
procedure!(Logout, "auth", "logout", () => ());
procedure!(
    /// The signed-in user
    Me, "auth", "me", () => UserProfile
);

#[derive(Debug, Clone)]
pub struct AuthService {
    base: RequestService,
}

impl AuthService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthSession, RequestError> {
        let credentials = Credentials {
            email: email.into(),
            password: password.into(),
        };
        let session = self.base.call::<Login>(&credentials).await?;
        tracing::info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), RequestError> {
        self.base.call::<Logout>(&()).await
    }

    pub async fn me(&self) -> Result<UserProfile, RequestError> {
        self.base.call::<Me>(&()).await
    }
}
