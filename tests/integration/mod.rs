//! Integration tests
//!
//! Exercise the transports, the RPC stack and the coordinator against real
//! local servers.

mod realtime_test;
mod request_test;
mod services_test;
mod sse_test;
mod websocket_test;
