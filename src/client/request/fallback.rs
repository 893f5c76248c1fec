//! Fetch-with-fallback combinator.
//!
//! Races a primary request against a short timeout and substitutes locally
//! held data when the request fails or is too slow. The timeout only decides
//! the substitution: the primary keeps running detached and its late result
//! is dropped.
//!
//! Services opt in per call site, each with its own timeout.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// A value tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sourced<T> {
    /// Returned by the server
    Live(T),
    /// Substituted fallback/demo data
    Fallback(T),
}

impl<T> Sourced<T> {
    pub fn into_inner(self) -> T {
        match self {
            Sourced::Live(value) | Sourced::Fallback(value) => value,
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            Sourced::Live(value) | Sourced::Fallback(value) => value,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Sourced::Live(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Sourced::Live(value) => Sourced::Live(f(value)),
            Sourced::Fallback(value) => Sourced::Fallback(f(value)),
        }
    }
}

/// Race `primary` against `timeout`, falling back to `fallback()` on
/// timeout or error. Must be called from within a tokio runtime.
pub async fn with_fallback<T, E, Fut, F>(primary: Fut, timeout: Duration, fallback: F) -> Sourced<T>
where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
    F: FnOnce() -> T,
{
    let mut handle = tokio::spawn(primary);

    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(Ok(value))) => Sourced::Live(value),
        Ok(Ok(Err(e))) => {
            tracing::debug!(error = %e, "primary request failed, using fallback data");
            Sourced::Fallback(fallback())
        }
        Ok(Err(join_error)) => {
            tracing::warn!(error = %join_error, "primary request task failed, using fallback data");
            Sourced::Fallback(fallback())
        }
        Err(_) => {
            tracing::debug!(
                timeout_ms = timeout.as_millis() as u64,
                "primary request timed out, using fallback data"
            );
            Sourced::Fallback(fallback())
        }
    }
}
