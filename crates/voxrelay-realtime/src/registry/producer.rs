//! Producer table: at most one current producer per device key.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use voxrelay_core::types::{ConnectionId, DeviceKey};

use crate::connection::handle::{CloseReason, ConnectionHandle};

/// Non-owning reference to the current producer of a key.
#[derive(Debug)]
struct ProducerSlot {
    id: ConnectionId,
    handle: Weak<ConnectionHandle>,
}

/// Outcome of installing a producer.
#[derive(Debug)]
pub enum ProducerRegistration {
    /// The key had no producer.
    Installed,
    /// The connection was already current; nothing changed.
    AlreadyCurrent,
    /// A previous producer was closed and replaced.
    Replaced(Arc<ConnectionHandle>),
}

/// Device key → current producer.
#[derive(Debug, Default)]
pub struct ProducerTable {
    slots: DashMap<DeviceKey, ProducerSlot>,
}

impl ProducerTable {
    /// Makes `conn` the current producer for `key`.
    ///
    /// A different previous producer is closed while the key's shard lock is
    /// held, so no reader can observe two producers for one key.
    pub fn register(&self, key: &DeviceKey, conn: &Arc<ConnectionHandle>) -> ProducerRegistration {
        let slot = ProducerSlot {
            id: conn.id,
            handle: Arc::downgrade(conn),
        };
        match self.slots.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().id == conn.id {
                    return ProducerRegistration::AlreadyCurrent;
                }
                let previous = entry.insert(slot);
                match previous.handle.upgrade() {
                    Some(old) => {
                        old.close(CloseReason::replaced());
                        ProducerRegistration::Replaced(old)
                    }
                    None => ProducerRegistration::Installed,
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(slot);
                ProducerRegistration::Installed
            }
        }
    }

    /// Removes the mapping only if `conn_id` is still the current producer.
    pub fn unregister(&self, key: &DeviceKey, conn_id: ConnectionId) -> bool {
        self.slots
            .remove_if(key, |_, slot| slot.id == conn_id)
            .is_some()
    }

    /// Returns the current producer if its transport is still open.
    pub fn current(&self, key: &DeviceKey) -> Option<Arc<ConnectionHandle>> {
        self.slots
            .get(key)
            .and_then(|slot| slot.handle.upgrade())
            .filter(|conn| conn.is_open())
    }

    /// Number of keys with a registered producer.
    pub fn count(&self) -> usize {
        self.slots.len()
    }
}
