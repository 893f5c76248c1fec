//! Client Sync Layer
//!
//! Keeps RDM Health data fresh and talks to the RPC server.
//!
//! # Architecture
//!
//! - **`config`** - Server URL and derived endpoint URLs
//! - **`listeners`** - Callback registries with unsubscribe handles
//! - **`transport`** - WebSocket, SSE and manually driven transports
//! - **`polling`** - Keyed polling service (fallback channel)
//! - **`realtime`** - Coordinator, sessions, sequence fencing
//! - **`rpc`** - Typed procedures and the HTTP RPC transport
//! - **`request`** - Retry/classification and fetch-with-fallback
//! - **`services`** - Typed API services
//! - **`context`** - Application root wiring
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs        - Module exports and documentation
//! ├── config.rs     - Configuration management
//! ├── context.rs    - SyncContext (transports + polling + coordinator)
//! ├── listeners.rs  - Listener registry and Subscription handles
//! ├── polling.rs    - PollingService
//! ├── transport/    - ConnectionStatus, reconnect policy, clients
//! ├── realtime/     - RealtimeCoordinator, RealtimeSession, fences
//! ├── rpc/          - Procedure trait, RpcClient, HTTP transport
//! ├── request/      - RequestService, error taxonomy, fallback
//! └── services/     - One module per API namespace
//! ```

pub mod config;
pub mod context;
pub mod listeners;
pub mod polling;
pub mod realtime;
pub mod request;
pub mod rpc;
pub mod services;
pub mod transport;

use std::sync::{Mutex, MutexGuard};

// Re-export commonly used types
pub use config::Config;
pub use context::SyncContext;
pub use listeners::Subscription;
pub use polling::PollingService;
pub use realtime::{RealtimeCoordinator, RealtimeOptions, RealtimeSession};
pub use request::{RequestError, RequestService};
pub use services::ApiServices;
pub use transport::ConnectionStatus;

/// Lock a mutex, recovering the data if a listener panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
