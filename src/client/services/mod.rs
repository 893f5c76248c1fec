//! # Typed API Services
//!
//! One thin service per server namespace. Every method goes through the
//! shared [`RequestService`] for retry and error classification; a few read
//! paths additionally race the server against a short timeout and fall back
//! to demo data (see [`with_fallback`](crate::client::request::with_fallback)).
//!
//! | Service        | Namespace      | Fallback reads                    |
//! |----------------|----------------|-----------------------------------|
//! | `admin`        | `admin`        | analytics                         |
//! | `provider`     | `provider`     | -                                 |
//! | `user`         | `user`         | -                                 |
//! | `wallet`       | `wallet`       | balance, transactions             |
//! | `goals`        | `goals`        | list                              |
//! | `health`       | `health`       | metrics                           |
//! | `medication`   | `medication`   | -                                 |
//! | `claims`       | `claims`       | -                                 |
//! | `appointment`  | `appointment`  | upcoming                          |
//! | `auth`         | `auth`         | -                                 |
//! | `notification` | `notification` | list                              |

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod claims;
pub mod demo;
pub mod goals;
pub mod health;
pub mod medication;
pub mod notification;
pub mod provider;
pub mod user;
pub mod wallet;

use std::sync::Arc;

use crate::client::config::Config;
use crate::client::request::RequestService;
use crate::client::rpc::{HttpRpcTransport, RpcClient};

pub use admin::AdminService;
pub use appointment::AppointmentService;
pub use auth::AuthService;
pub use claims::ClaimsService;
pub use goals::GoalsService;
pub use health::HealthService;
pub use medication::MedicationService;
pub use notification::NotificationService;
pub use provider::ProviderService;
pub use user::UserService;
pub use wallet::WalletService;

/// Every typed service over one shared [`RequestService`]
#[derive(Debug, Clone)]
pub struct ApiServices {
    pub admin: AdminService,
    pub provider: ProviderService,
    pub user: UserService,
    pub wallet: WalletService,
    pub goals: GoalsService,
    pub health: HealthService,
    pub medication: MedicationService,
    pub claims: ClaimsService,
    pub appointment: AppointmentService,
    pub auth: AuthService,
    pub notification: NotificationService,
    base: RequestService,
}

impl ApiServices {
    pub fn new(base: RequestService) -> Self {
        Self {
            admin: AdminService::new(base.clone()),
            provider: ProviderService::new(base.clone()),
            user: UserService::new(base.clone()),
            wallet: WalletService::new(base.clone()),
            goals: GoalsService::new(base.clone()),
            health: HealthService::new(base.clone()),
            medication: MedicationService::new(base.clone()),
            claims: ClaimsService::new(base.clone()),
            appointment: AppointmentService::new(base.clone()),
            auth: AuthService::new(base.clone()),
            notification: NotificationService::new(base.clone()),
            base,
        }
    }

    /// Services talking HTTP RPC to `config`'s server
    pub fn from_config(config: &Config) -> Self {
        let transport = HttpRpcTransport::new(config.clone());
        Self::new(RequestService::new(RpcClient::new(Arc::new(transport))))
    }

    pub fn base(&self) -> &RequestService {
        &self.base
    }
}
