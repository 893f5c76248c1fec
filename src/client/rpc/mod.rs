//! # Typed RPC Client
//!
//! Every server procedure is a zero-sized type implementing [`Procedure`],
//! which fixes its namespace, method name, input and output at compile time.
//! [`RpcClient::call`] keeps the `client.<namespace>.<method>(input)` shape
//! while the network side sits behind the [`RpcTransport`] trait.
//!
//! Procedures are declared with the [`procedure!`](crate::procedure) macro:
//!
//! ```rust
//! use rdm_sync::procedure;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! pub struct Ping;
//! #[derive(Deserialize)]
//! pub struct Pong { pub ok: bool }
//!
//! procedure!(
//!     /// health.ping
//!     HealthPing, "health", "ping", Ping => Pong
//! );
//! ```

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use http::HttpRpcTransport;

/// A server procedure with statically known input and output types
pub trait Procedure {
    const NAMESPACE: &'static str;
    const METHOD: &'static str;
    type Input: Serialize + Send + Sync;
    type Output: DeserializeOwned + Send;
}

/// Declare a [`Procedure`] type
#[macro_export]
macro_rules! procedure {
    ($(#[$meta:meta])* $name:ident, $namespace:literal, $method:literal, $input:ty => $output:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl $crate::client::rpc::Procedure for $name {
            const NAMESPACE: &'static str = $namespace;
            const METHOD: &'static str = $method;
            type Input = $input;
            type Output = $output;
        }
    };
}

/// Failures at the RPC boundary, before classification
#[derive(Debug, Error, Clone)]
pub enum RpcError {
    /// The server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        /// Parsed error body, when the server sent JSON
        data: Option<serde_json::Value>,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The client has no such procedure
    #[error("{namespace}.{method} is not a function")]
    MissingProcedure { namespace: String, method: String },

    /// Input could not be encoded or output could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            RpcError::Network(format!("Failed to fetch: {}", err))
        } else if err.is_decode() {
            RpcError::Decode(err.to_string())
        } else {
            RpcError::Other(err.to_string())
        }
    }
}

/// Network side of the RPC client
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(
        &self,
        namespace: &str,
        method: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;
}

/// Typed RPC client
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Invoke procedure `P`
    pub async fn call<P: Procedure>(&self, input: &P::Input) -> Result<P::Output, RpcError> {
        let input = serde_json::to_value(input)
            .map_err(|e| RpcError::Decode(format!("{}.{} input: {}", P::NAMESPACE, P::METHOD, e)))?;

        tracing::debug!(namespace = P::NAMESPACE, method = P::METHOD, "rpc call");
        let output = self.transport.call(P::NAMESPACE, P::METHOD, input).await?;

        serde_json::from_value(output)
            .map_err(|e| RpcError::Decode(format!("{}.{} output: {}", P::NAMESPACE, P::METHOD, e)))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").finish_non_exhaustive()
    }
}
