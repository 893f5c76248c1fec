//! # Request Service
//!
//! Uniform error classification and retry policy for every RPC call made by
//! the typed API services.
//!
//! ## Retry Policy
//!
//! `retries` is the total attempt budget (default 3):
//!
//! - **Unauthorized / structured / configuration** errors fail at once
//! - **Network** errors sleep `base_delay * (attempt + 1)` and retry; the
//!   last failure becomes [`RequestError::Network`]
//! - **Unknown** errors retry without delay; the last failure becomes
//!   [`RequestError::Unknown`] with the error's own message
//!
//! Nothing survives between two `handle_request` calls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rdm_sync::client::request::RequestService;
//! use rdm_sync::client::rpc::{HttpRpcTransport, RpcClient};
//! use rdm_sync::client::Config;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rpc = RpcClient::new(Arc::new(HttpRpcTransport::new(Config::from_env()?)));
//! let service = RequestService::new(rpc);
//! let value: u32 = service.handle_request(|| async { Ok(42) }).await?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod fallback;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::client::rpc::{Procedure, RpcClient, RpcError};
use classify::{classify, ErrorClass};

pub use fallback::{with_fallback, Sourced};

/// Message used when an error carries no text of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Classified request failure, with user-facing messages
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RequestError {
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("API client configuration error: {0}")]
    Configuration(String),

    /// Carries the underlying failure for logs; the message is fixed.
    #[error("Network error: unable to reach the server. Please check your connection.")]
    Network(String),

    #[error("{0}")]
    Unknown(String),
}

/// Retry settings for [`RequestService`]
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request
    pub attempts: u32,
    /// Unit of the linear backoff between network retries
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }
}

/// Request wrapper shared by every API service
#[derive(Debug, Clone)]
pub struct RequestService {
    rpc: RpcClient,
    policy: RetryPolicy,
}

impl RequestService {
    pub fn new(rpc: RpcClient) -> Self {
        Self::with_policy(rpc, RetryPolicy::default())
    }

    pub fn with_policy(rpc: RpcClient, policy: RetryPolicy) -> Self {
        Self { rpc, policy }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call procedure `P` through the retry policy
    pub async fn call<P: Procedure>(&self, input: &P::Input) -> Result<P::Output, RequestError> {
        self.handle_request(|| self.rpc.call::<P>(input)).await
    }

    /// Run `request` with the default attempt budget
    pub async fn handle_request<T, F, Fut>(&self, request: F) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        self.handle_request_with_retries(request, self.policy.attempts)
            .await
    }

    /// Run `request` with at most `retries` attempts (at least one)
    pub async fn handle_request_with_retries<T, F, Fut>(
        &self,
        mut request: F,
        retries: u32,
    ) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let attempts = retries.max(1);

        for attempt in 0..attempts {
            let error = match request().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            let is_last = attempt + 1 == attempts;

            match classify(&error) {
                ErrorClass::Unauthorized => {
                    tracing::info!(error = %error, "request unauthorized, session expired");
                    return Err(RequestError::SessionExpired);
                }
                ErrorClass::Structured => {
                    return Err(match error {
                        RpcError::Http { status, message, .. } => RequestError::Api { status, message },
                        other => RequestError::Api {
                            status: 0,
                            message: other.to_string(),
                        },
                    });
                }
                ErrorClass::Configuration => {
                    tracing::error!(error = %error, "rpc client misconfigured");
                    return Err(RequestError::Configuration(error.to_string()));
                }
                ErrorClass::Network => {
                    if is_last {
                        tracing::warn!(error = %error, attempts, "network retries exhausted");
                        return Err(RequestError::Network(error.to_string()));
                    }
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        error = %error,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "network error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                ErrorClass::Unknown => {
                    if is_last {
                        let message = match error.to_string() {
                            m if m.trim().is_empty() => GENERIC_ERROR_MESSAGE.to_string(),
                            m => m,
                        };
                        return Err(RequestError::Unknown(message));
                    }
                    tracing::debug!(error = %error, attempt = attempt + 1, "request failed, retrying");
                }
            }
        }

        Err(RequestError::Unknown(GENERIC_ERROR_MESSAGE.to_string()))
    }
}
