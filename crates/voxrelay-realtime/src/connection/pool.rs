//! Connection pool: every connection the transport layer currently owns.

use std::sync::Arc;

use dashmap::DashMap;

use voxrelay_core::types::ConnectionId;

use super::handle::{ConnectionHandle, Role};

/// Thread-safe pool of all active relay connections, keyed by connection ID.
///
/// This is the set the liveness supervisor walks. Routing by device key goes
/// through [`RelayRegistry`](crate::registry::RelayRegistry) instead.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns the number of active connections with the given role.
    pub fn count_by_role(&self, role: Role) -> usize {
        self.by_id
            .iter()
            .filter(|entry| entry.value().role == role)
            .count()
    }
}
