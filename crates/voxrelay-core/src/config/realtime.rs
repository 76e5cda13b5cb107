//! Real-time relay engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Interval between liveness pings, in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Outbound queue depth per connection. When a listener's queue is
    /// full, frames for that listener are dropped.
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
    /// Maximum inbound WebSocket message size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl RealtimeConfig {
    /// Returns the ping interval as a [`Duration`].
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ping_interval_seconds: default_ping_interval(),
            send_buffer_size: default_send_buffer(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_ping_interval() -> u64 {
    15
}

fn default_send_buffer() -> usize {
    64
}

fn default_max_message_size() -> usize {
    64 * 1024
}
