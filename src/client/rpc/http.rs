//! HTTP RPC Transport
//!
//! Posts JSON input to `{server}/rpc/{namespace}/{method}` and decodes the
//! JSON response. Auth cookies and session headers are attached by the
//! `reqwest::Client` the caller supplies.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use uuid::Uuid;

use crate::client::config::Config;
use crate::client::rpc::{RpcError, RpcTransport};

/// RPC over HTTP POST
#[derive(Debug, Clone)]
pub struct HttpRpcTransport {
    config: Config,
    client: Client,
}

impl HttpRpcTransport {
    pub fn new(config: Config) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(
        &self,
        namespace: &str,
        method: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let url = self.config.rpc_url(namespace, method);
        let request_id = Uuid::new_v4();

        let response = self
            .client
            .post(&url)
            .header("X-Request-Id", request_id.to_string())
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            if status == StatusCode::NO_CONTENT {
                return Ok(serde_json::Value::Null);
            }
            return response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| RpcError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%url, %request_id, status = status.as_u16(), "rpc call failed");
        Err(error_from_response(namespace, method, status, &body))
    }
}

/// Map a non-success response to an [`RpcError`].
///
/// A JSON body makes it a structured error carrying the server's message; a
/// bare 404 means the procedure does not exist on this server.
fn error_from_response(namespace: &str, method: &str, status: StatusCode, body: &str) -> RpcError {
    let parsed = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .filter(|value| value.is_object());

    match parsed {
        Some(data) => {
            let message = data
                .get("message")
                .or_else(|| data.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| default_message(status));
            RpcError::Http {
                status: status.as_u16(),
                message,
                data: Some(data),
            }
        }
        None if status == StatusCode::NOT_FOUND => RpcError::MissingProcedure {
            namespace: namespace.to_string(),
            method: method.to_string(),
        },
        None => {
            let text = body.trim();
            RpcError::Http {
                status: status.as_u16(),
                message: if text.is_empty() {
                    default_message(status)
                } else {
                    text.to_string()
                },
                data: None,
            }
        }
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
