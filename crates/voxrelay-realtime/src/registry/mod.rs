//! Relay registry: who produces and who listens, per device key.
//!
//! Concurrency discipline: both tables are `DashMap`s, so every mutation of a
//! key runs under that key's shard lock and mutations of the same key are
//! serialized. Readers take snapshots and release the lock before sending.
//! The registry stores `Weak` references only; connection tasks own their
//! handles.

pub mod listener;
pub mod producer;

use std::sync::Arc;

use voxrelay_core::types::{ConnectionId, DeviceKey};

use crate::connection::handle::ConnectionHandle;

pub use listener::ListenerTable;
pub use producer::{ProducerRegistration, ProducerTable};

/// Registry of producers and listeners, owned by the relay engine.
#[derive(Debug, Default)]
pub struct RelayRegistry {
    producers: ProducerTable,
    listeners: ListenerTable,
}

impl RelayRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `conn` as the producer for `key`, closing any other producer.
    pub fn register_producer(
        &self,
        key: &DeviceKey,
        conn: &Arc<ConnectionHandle>,
    ) -> ProducerRegistration {
        self.producers.register(key, conn)
    }

    /// Removes `conn_id` as producer of `key` if it is still the current one.
    pub fn unregister_producer(&self, key: &DeviceKey, conn_id: ConnectionId) -> bool {
        self.producers.unregister(key, conn_id)
    }

    /// Adds a listener for `key`.
    pub fn register_listener(&self, key: &DeviceKey, conn: &Arc<ConnectionHandle>) -> bool {
        self.listeners.add(key, conn)
    }

    /// Removes a listener for `key`.
    pub fn remove_listener(&self, key: &DeviceKey, conn_id: ConnectionId) -> bool {
        self.listeners.remove(key, conn_id)
    }

    /// The open producer for `key`, if any.
    pub fn current_producer(&self, key: &DeviceKey) -> Option<Arc<ConnectionHandle>> {
        self.producers.current(key)
    }

    /// Snapshot of the open listeners for `key`.
    pub fn listeners(&self, key: &DeviceKey) -> Vec<Arc<ConnectionHandle>> {
        self.listeners.snapshot(key)
    }

    /// Number of listeners registered for `key`.
    pub fn listener_count(&self, key: &DeviceKey) -> usize {
        self.listeners.count(key)
    }

    /// Whether `key` has a listener entry. Emptied entries are pruned.
    pub fn has_listener_entry(&self, key: &DeviceKey) -> bool {
        self.listeners.contains_key(key)
    }

    /// Number of keys with a registered producer.
    pub fn producer_count(&self) -> usize {
        self.producers.count()
    }

    /// Number of keys with at least one listener.
    pub fn listened_key_count(&self) -> usize {
        self.listeners.key_count()
    }
}
