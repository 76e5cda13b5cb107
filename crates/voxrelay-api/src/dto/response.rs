//! Response DTOs.

use serde::{Deserialize, Serialize};

use voxrelay_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Basic health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
}

/// Health response with relay statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Open connections of any role.
    pub connections: usize,
    /// Open producer connections.
    pub producers: usize,
    /// Open subscriber connections.
    pub subscribers: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// Per-device status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatusResponse {
    /// Device key.
    pub device_key: String,
    /// Whether a producer is connected.
    pub producer_online: bool,
    /// Number of registered listeners.
    pub listener_count: usize,
}

/// Result of a delivered control command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Device key.
    pub device_key: String,
    /// Wire `type` of the command.
    pub operation: String,
    /// The producer's transport accepted the command.
    pub delivered: bool,
}
