//! Top-level relay engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use voxrelay_core::config::{AuthConfig, RealtimeConfig};

use crate::connection::authenticator::TokenAuthenticator;
use crate::connection::handle::CloseReason;
use crate::connection::heartbeat::LivenessSupervisor;
use crate::connection::manager::ConnectionManager;
use crate::control::bridge::ControlBridge;
use crate::metrics::RelayMetrics;
use crate::registry::RelayRegistry;
use crate::routing::router::FrameRouter;

/// Central relay engine, constructed once at startup and shared by all
/// connection tasks and HTTP handlers.
#[derive(Clone)]
pub struct RelayEngine {
    /// Connection lifecycle.
    pub connections: Arc<ConnectionManager>,
    /// Producer/listener registry.
    pub registry: Arc<RelayRegistry>,
    /// Inbound message router.
    pub router: Arc<FrameRouter>,
    /// Admin command bridge.
    pub control: Arc<ControlBridge>,
    /// Token gate for connections and admin calls.
    pub authenticator: Arc<TokenAuthenticator>,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    /// Configuration.
    pub config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEngine").finish()
    }
}

impl RelayEngine {
    /// Creates a new relay engine with all subsystems.
    pub fn new(config: RealtimeConfig, auth: &AuthConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RelayMetrics::new());
        let registry = Arc::new(RelayRegistry::new());
        let authenticator = Arc::new(TokenAuthenticator::new(auth));
        let connections = Arc::new(ConnectionManager::new(
            config.clone(),
            registry.clone(),
            metrics.clone(),
        ));
        let router = Arc::new(FrameRouter::new(registry.clone(), metrics.clone()));
        let control = Arc::new(ControlBridge::new(
            authenticator.clone(),
            registry.clone(),
            metrics.clone(),
        ));

        info!("Relay engine initialized");

        Self {
            connections,
            registry,
            router,
            control,
            authenticator,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Starts the liveness supervisor on the current runtime.
    pub fn start_supervisor(&self) -> JoinHandle<()> {
        LivenessSupervisor::new(
            self.connections.pool().clone(),
            self.metrics.clone(),
            self.config.ping_interval(),
        )
        .spawn(self.shutdown_receiver())
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Stops background tasks and closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down relay engine");

        let _ = self.shutdown_tx.send(());
        self.connections.close_all(CloseReason::shutdown());

        info!("Relay engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use voxrelay_core::types::DeviceKey;

    use crate::connection::authenticator::AuthenticatedConnection;
    use crate::connection::handle::Role;

    fn engine() -> RelayEngine {
        RelayEngine::new(
            RealtimeConfig {
                ping_interval_seconds: 1,
                ..RealtimeConfig::default()
            },
            &AuthConfig {
                tokens: vec!["secret".to_string()],
            },
        )
    }

    #[tokio::test]
    async fn test_shutdown_stops_supervisor_and_closes_connections() {
        let engine = engine();
        let supervisor = engine.start_supervisor();
        let (conn, _rx) = engine.connections.open(AuthenticatedConnection {
            device_key: DeviceKey::parse("dev1").unwrap(),
            role: Role::Producer,
        });

        engine.shutdown();

        tokio::time::timeout(Duration::from_secs(1), supervisor)
            .await
            .expect("supervisor should stop")
            .unwrap();
        assert!(!conn.is_open());
        assert_eq!(engine.connections.connection_count(), 0);
        assert_eq!(engine.registry.producer_count(), 0);
    }
}
