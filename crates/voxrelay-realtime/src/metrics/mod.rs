//! Relay engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    producers_replaced: AtomicU64,
    frames_received: AtomicU64,
    frames_rejected: AtomicU64,
    frames_delivered: AtomicU64,
    deliveries_dropped: AtomicU64,
    control_sent: AtomicU64,
    device_reports: AtomicU64,
    reports_rejected: AtomicU64,
    pings_sent: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection was registered.
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was unregistered.
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// A producer was evicted by a newer one.
    pub fn producer_replaced(&self) {
        self.producers_replaced.fetch_add(1, Ordering::Relaxed);
    }

    /// A binary message arrived from a producer.
    pub fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A binary message had the wrong length and was discarded.
    pub fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A text message from a device was not valid JSON.
    pub fn report_rejected(&self) {
        self.reports_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the outcome of one fan-out.
    pub fn fan_out(&self, delivered: u64, dropped: u64) {
        self.frames_delivered.fetch_add(delivered, Ordering::Relaxed);
        self.deliveries_dropped.fetch_add(dropped, Ordering::Relaxed);
    }

    /// A control command was accepted by a producer's transport.
    pub fn control_sent(&self) {
        self.control_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// A structured report arrived from a device.
    pub fn device_report(&self) {
        self.device_reports.fetch_add(1, Ordering::Relaxed);
    }

    /// Liveness pings queued in one sweep.
    pub fn pings_sent(&self, count: u64) {
        self.pings_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            producers_replaced: self.producers_replaced.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            control_sent: self.control_sent.load(Ordering::Relaxed),
            device_reports: self.device_reports.load(Ordering::Relaxed),
            reports_rejected: self.reports_rejected.load(Ordering::Relaxed),
            pings_sent: self.pings_sent.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_total: u64,
    /// Currently registered connections
    pub connections_active: u64,
    /// Producers evicted by a newer producer
    pub producers_replaced: u64,
    /// Binary messages received from producers
    pub frames_received: u64,
    /// Binary messages discarded for having the wrong length
    pub frames_rejected: u64,
    /// Frame copies queued to listeners
    pub frames_delivered: u64,
    /// Frame copies dropped for slow or closed listeners
    pub deliveries_dropped: u64,
    /// Control commands handed to devices
    pub control_sent: u64,
    /// Structured reports received from devices
    pub device_reports: u64,
    /// Device text messages discarded as malformed
    pub reports_rejected: u64,
    /// Liveness pings queued
    pub pings_sent: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_connections_never_underflow() {
        let metrics = RelayMetrics::new();
        metrics.connection_opened();
        metrics.connection_closed();
        metrics.connection_closed();

        let snap = metrics.snapshot();
        assert_eq!(snap.connections_total, 1);
        assert_eq!(snap.connections_active, 0);
    }

    #[test]
    fn test_fan_out_accumulates() {
        let metrics = RelayMetrics::new();
        metrics.fan_out(3, 1);
        metrics.fan_out(2, 0);

        let snap = metrics.snapshot();
        assert_eq!(snap.frames_delivered, 5);
        assert_eq!(snap.deliveries_dropped, 1);
    }
}
