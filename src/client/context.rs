//! Application root wiring.
//!
//! One `SyncContext` per application: both transports, the polling service
//! and the coordinator that composes them. Build it once and hand out
//! references; nothing here is a global.

use std::sync::Arc;

use crate::client::config::Config;
use crate::client::polling::PollingService;
use crate::client::realtime::{RealtimeCoordinator, SseTransport, WsTransport};
use crate::client::transport::{ManualTransport, ReconnectPolicy, SseClient, WebSocketClient};
use crate::shared::{ConfigError, SseEvent, WsMessage};

/// Transports, polling service and coordinator for one server
pub struct SyncContext {
    websocket: WsTransport,
    sse: SseTransport,
    polling: Arc<PollingService>,
    coordinator: RealtimeCoordinator,
}

impl SyncContext {
    /// Network-backed context for `config`'s server
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Self::with_policy(config, ReconnectPolicy::default())
    }

    pub fn with_policy(config: &Config, policy: ReconnectPolicy) -> Result<Self, ConfigError> {
        config.app().validate()?;
        let websocket = WebSocketClient::with_policy(config.websocket_url(), policy.clone());
        let sse = SseClient::with_policy(config.sse_url(), policy);
        tracing::debug!(
            websocket = %websocket.url(),
            sse = %sse.url(),
            "sync context created"
        );
        Ok(Self::with_transports(Arc::new(websocket), Arc::new(sse)))
    }

    /// Context over caller-supplied transports
    pub fn with_transports(websocket: WsTransport, sse: SseTransport) -> Self {
        let polling = Arc::new(PollingService::new());
        let coordinator =
            RealtimeCoordinator::new(Arc::clone(&websocket), Arc::clone(&sse), Arc::clone(&polling));
        Self {
            websocket,
            sse,
            polling,
            coordinator,
        }
    }

    /// Offline context: transports never connect, so sessions poll
    pub fn demo() -> Self {
        Self::with_transports(
            Arc::new(ManualTransport::<WsMessage>::new()),
            Arc::new(ManualTransport::<SseEvent>::new()),
        )
    }

    pub fn coordinator(&self) -> &RealtimeCoordinator {
        &self.coordinator
    }

    pub fn polling(&self) -> &Arc<PollingService> {
        &self.polling
    }

    pub fn websocket(&self) -> &WsTransport {
        &self.websocket
    }

    pub fn sse(&self) -> &SseTransport {
        &self.sse
    }

    /// Disconnect both transports and stop every polling task
    pub fn shutdown(&self) {
        self.websocket.disconnect();
        self.sse.disconnect();
        self.polling.stop_all();
        tracing::info!("sync context shut down");
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}
