//! Listener table: device key → set of subscriber connections.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use voxrelay_core::types::{ConnectionId, DeviceKey};

use crate::connection::handle::ConnectionHandle;

/// Device key → subscribers, with empty sets pruned.
#[derive(Debug, Default)]
pub struct ListenerTable {
    sets: DashMap<DeviceKey, HashMap<ConnectionId, Weak<ConnectionHandle>>>,
}

impl ListenerTable {
    /// Adds `conn` to the set for `key`. Returns `false` if it was already a member.
    pub fn add(&self, key: &DeviceKey, conn: &Arc<ConnectionHandle>) -> bool {
        self.sets
            .entry(key.clone())
            .or_default()
            .insert(conn.id, Arc::downgrade(conn))
            .is_none()
    }

    /// Removes `conn_id` from the set for `key`, pruning the key when emptied.
    pub fn remove(&self, key: &DeviceKey, conn_id: ConnectionId) -> bool {
        let removed = self
            .sets
            .get_mut(key)
            .map(|mut set| set.remove(&conn_id).is_some())
            .unwrap_or(false);

        if removed {
            self.sets.remove_if(key, |_, set| set.is_empty());
        }
        removed
    }

    /// Snapshot of the open subscribers for `key`.
    ///
    /// The shard lock is released before the caller sends anything.
    pub fn snapshot(&self, key: &DeviceKey) -> Vec<Arc<ConnectionHandle>> {
        self.sets
            .get(key)
            .map(|set| {
                set.values()
                    .filter_map(Weak::upgrade)
                    .filter(|conn| conn.is_open())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of members registered for `key`.
    pub fn count(&self, key: &DeviceKey) -> usize {
        self.sets.get(key).map(|set| set.len()).unwrap_or(0)
    }

    /// Whether `key` has an entry at all.
    pub fn contains_key(&self, key: &DeviceKey) -> bool {
        self.sets.contains_key(key)
    }

    /// Number of keys with at least one subscriber.
    pub fn key_count(&self) -> usize {
        self.sets.len()
    }
}
