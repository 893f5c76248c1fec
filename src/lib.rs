//! RDM Sync - Client Data Layer
//!
//! RDM Sync is the client-side data layer of the RDM Health patient engagement
//! platform. Patients earn RDM tokens for medication adherence, completed
//! habits and attended appointments; staff manage patients, claims and
//! analytics. This crate keeps that data fresh and reaches the RPC server.
//!
//! # Overview
//!
//! - Real-time synchronization over WebSocket and Server-Sent Events
//! - Keyed polling as the fallback when no live transport is up
//! - A coordinator that decides which channel is authoritative per data key
//! - A request layer with retry/backoff, error classification and
//!   timeout-to-demo-data fallback
//! - Typed API services over a statically typed RPC client
//!
//! # Module Structure
//!
//! - **`shared`** - Platform-agnostic types
//!   - Wire envelopes for WebSocket and SSE
//!   - Configuration and shared error types
//!
//! - **`client`** - The sync and request layer
//!   - `transport` - WebSocket and SSE clients with status listeners
//!   - `polling` - Keyed polling service
//!   - `realtime` - Coordinator, sessions and sequence fencing
//!   - `request` - Retry/classification and the fallback combinator
//!   - `rpc` - Typed procedures and the HTTP transport
//!   - `services` - Admin, provider, user, wallet, goals, health, medication,
//!     claims, appointment, auth and notification services
//!
//! # Usage
//!
//! ```rust,no_run
//! use rdm_sync::client::{Config, SyncContext};
//! use rdm_sync::client::realtime::{fetch_fn, RealtimeOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let sync = SyncContext::new(&config)?;
//!
//! let session = sync.coordinator().subscribe(
//!     "wallet",
//!     fetch_fn(|ticket| async move {
//!         // fetch, then apply only if the ticket is still current
//!         if ticket.try_commit() { /* update state */ }
//!         Ok(())
//!     }),
//!     RealtimeOptions::default(),
//! );
//! session.connect();
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - Transport clients, the polling service and the coordinator are shared
//!   through `Arc` and guard their state with mutexes.
//! - Listener callbacks run on the task observing the transition and must not
//!   block.
//!
//! # Error Handling
//!
//! - `Result<T, E>` for fallible operations
//! - Connection failures are reported as status transitions, never as errors
//! - Request failures are classified into `client::request::RequestError`

/// Shared types and data structures
pub mod shared;

/// Realtime transports, polling, coordination and typed API services
pub mod client;
