//! Connection manager: handles connection lifecycle (open, close, shutdown).

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use voxrelay_core::config::RealtimeConfig;

use crate::metrics::RelayMetrics;
use crate::registry::{ProducerRegistration, RelayRegistry};

use super::authenticator::AuthenticatedConnection;
use super::handle::{CloseReason, ConnectionHandle, Outbound, Role};
use super::pool::ConnectionPool;

/// Manages all active relay connections.
///
/// Every registry mutation caused by a connection opening or closing goes
/// through here, so the pool and the registry stay in step.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Producer/listener registry.
    registry: Arc<RelayRegistry>,
    /// Metrics.
    metrics: Arc<RelayMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<RelayRegistry>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            registry,
            metrics,
            config,
        }
    }

    /// Registers a new authenticated connection under its role.
    ///
    /// Returns the connection handle and the receiver its writer drains. A
    /// producer evicts any earlier producer for the same device key.
    pub fn open(
        &self,
        auth: AuthenticatedConnection,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<Outbound>) {
        let (handle, rx) =
            ConnectionHandle::new(auth.role, auth.device_key, self.config.send_buffer_size);
        let handle = Arc::new(handle);

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        match handle.role {
            Role::Producer => {
                if let ProducerRegistration::Replaced(old) =
                    self.registry.register_producer(&handle.device_key, &handle)
                {
                    self.metrics.producer_replaced();
                    info!(
                        device_key = %handle.device_key,
                        old_conn_id = %old.id,
                        new_conn_id = %handle.id,
                        "Producer replaced"
                    );
                }
            }
            Role::Subscriber => {
                self.registry.register_listener(&handle.device_key, &handle);
            }
        }

        info!(
            conn_id = %handle.id,
            device_key = %handle.device_key,
            role = %handle.role,
            "Connection registered"
        );

        (handle, rx)
    }

    /// Unregisters a connection and removes every registry reference to it.
    ///
    /// Idempotent; safe to call after an eviction or a shutdown.
    pub fn close(&self, handle: &ConnectionHandle) {
        match handle.role {
            Role::Producer => {
                self.registry
                    .unregister_producer(&handle.device_key, handle.id);
            }
            Role::Subscriber => {
                self.registry.remove_listener(&handle.device_key, handle.id);
            }
        }

        handle.close(CloseReason::normal());

        if self.pool.remove(&handle.id).is_some() {
            self.metrics.connection_closed();
            let connected_secs = (Utc::now() - handle.connected_at).num_seconds();
            info!(
                conn_id = %handle.id,
                device_key = %handle.device_key,
                role = %handle.role,
                connected_secs,
                "Connection unregistered"
            );
        } else {
            debug!(conn_id = %handle.id, "Connection already unregistered");
        }
    }

    /// Closes all connections.
    pub fn close_all(&self, reason: CloseReason) {
        let all = self.pool.all_connections();
        for conn in &all {
            conn.close(reason.clone());
            self.close(conn);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of connections with the given role.
    pub fn count_by_role(&self, role: Role) -> usize {
        self.pool.count_by_role(role)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }
}
