//! Common test utilities and helpers
//!
//! - Throwaway WebSocket server and HTTP RPC wiring
//! - Polling helpers for asynchronous conditions
//! - Custom assertion macros

pub mod assertions;
pub mod servers;

pub use servers::*;
