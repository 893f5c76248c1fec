//! Shared Module
//!
//! Types shared by every part of the client: wire envelopes for the live
//! transports, configuration and the common error type. Nothing here
//! performs I/O.

/// WebSocket and SSE wire envelopes
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{SseData, SseEvent, WsMessage};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
