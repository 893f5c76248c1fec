//! Error classification for RPC failures.
//!
//! Order matters: authorization is checked before the structured-payload
//! rule, so a 401 with a JSON body is still a session problem.

use crate::client::rpc::RpcError;

/// How the request layer treats a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 401 or "Unauthorized": fail now, never retry
    Unauthorized,
    /// Server sent an error payload: fail now with its message
    Structured,
    /// Client/transport misconfiguration: fail now
    Configuration,
    /// Transient connectivity failure: retry with backoff
    Network,
    /// Anything else: retry, fail on the final attempt
    Unknown,
}

impl ErrorClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorClass::Network | ErrorClass::Unknown)
    }
}

pub fn classify(error: &RpcError) -> ErrorClass {
    let message = error.to_string();

    if matches!(error, RpcError::Http { status: 401, .. }) || message.contains("Unauthorized") {
        return ErrorClass::Unauthorized;
    }
    if matches!(error, RpcError::Http { data: Some(_), .. }) {
        return ErrorClass::Structured;
    }
    if matches!(error, RpcError::MissingProcedure { .. }) || message.contains("is not a function") {
        return ErrorClass::Configuration;
    }

    let lowered = message.to_lowercase();
    if matches!(error, RpcError::Network(_))
        || lowered.contains("failed to fetch")
        || lowered.contains("fetch failed")
        || lowered.contains("network")
    {
        return ErrorClass::Network;
    }

    ErrorClass::Unknown
}
