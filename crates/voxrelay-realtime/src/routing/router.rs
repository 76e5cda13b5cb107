//! Frame router: classifies a connection's inbound messages and fans valid
//! audio frames out to the listeners of the producer's device key.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use voxrelay_core::error::ErrorKind;
use voxrelay_core::types::DeviceKey;

use crate::connection::handle::{ConnectionHandle, Outbound, Role};
use crate::message::frame::AudioFrame;
use crate::message::types::{DeviceMessage, InboundMessage};
use crate::metrics::RelayMetrics;
use crate::registry::RelayRegistry;

/// Result of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    /// Listeners whose queue accepted the frame.
    pub delivered: usize,
    /// Listeners that were skipped (full queue or closed transport).
    pub dropped: usize,
}

/// What the router did with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A valid frame was fanned out.
    Forwarded(FanOut),
    /// A device report was parsed and logged.
    Report(DeviceMessage),
    /// The message broke the wire contract and was discarded.
    Rejected,
    /// The message came from a subscriber and was ignored.
    Ignored,
}

/// Routes producer traffic to listeners.
#[derive(Debug)]
pub struct FrameRouter {
    registry: Arc<RelayRegistry>,
    metrics: Arc<RelayMetrics>,
}

impl FrameRouter {
    /// Creates a router over the shared registry.
    pub fn new(registry: Arc<RelayRegistry>, metrics: Arc<RelayMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Handles one inbound message from `conn`.
    ///
    /// Protocol violations are dropped without touching the connection.
    pub fn route(&self, conn: &ConnectionHandle, msg: InboundMessage) -> RouteOutcome {
        if conn.role == Role::Subscriber {
            trace!(conn_id = %conn.id, "Ignoring data from subscriber");
            return RouteOutcome::Ignored;
        }

        match msg {
            InboundMessage::Binary(payload) => {
                self.metrics.frame_received();
                match AudioFrame::try_from(payload) {
                    Ok(frame) => RouteOutcome::Forwarded(self.fan_out(&conn.device_key, &frame)),
                    Err(e) => {
                        trace!(conn_id = %conn.id, error = %e, "Dropping malformed frame");
                        self.metrics.frame_rejected();
                        RouteOutcome::Rejected
                    }
                }
            }
            InboundMessage::Text(text) => self.handle_report(conn, &text),
        }
    }

    /// Sends `frame` to every open listener of `key`.
    ///
    /// Works on a snapshot, so registrations are never blocked by slow sends.
    /// Each listener is independent: a full or closed queue only drops this
    /// frame for that listener.
    pub fn fan_out(&self, key: &DeviceKey, frame: &AudioFrame) -> FanOut {
        let listeners = self.registry.listeners(key);
        let mut result = FanOut::default();

        for listener in &listeners {
            match listener.send(Outbound::Frame(frame.as_bytes().clone())) {
                Ok(()) => result.delivered += 1,
                Err(e) => {
                    result.dropped += 1;
                    if e.kind == ErrorKind::Delivery {
                        debug!(conn_id = %listener.id, device_key = %key, "Listener too slow, frame dropped");
                    } else {
                        trace!(conn_id = %listener.id, error = %e, "Listener gone during fan-out");
                    }
                }
            }
        }

        self.metrics
            .fan_out(result.delivered as u64, result.dropped as u64);
        result
    }

    fn handle_report(&self, conn: &ConnectionHandle, text: &str) -> RouteOutcome {
        let report = match serde_json::from_str::<DeviceMessage>(text) {
            Ok(report) => report,
            Err(e) => {
                debug!(conn_id = %conn.id, error = %e, "Discarding malformed device message");
                self.metrics.report_rejected();
                return RouteOutcome::Rejected;
            }
        };

        self.metrics.device_report();
        match &report {
            DeviceMessage::WifiAck { ok: true, ssid, .. } => {
                info!(
                    device_key = %conn.device_key,
                    ssid = ssid.as_deref().unwrap_or(""),
                    "Device applied Wi-Fi configuration"
                );
            }
            DeviceMessage::WifiAck { ok: false, ssid, message } => {
                warn!(
                    device_key = %conn.device_key,
                    ssid = ssid.as_deref().unwrap_or(""),
                    reason = message.as_deref().unwrap_or(""),
                    "Device rejected Wi-Fi configuration"
                );
            }
            DeviceMessage::Diagnostic => {
                debug!(device_key = %conn.device_key, message = %text, "Device diagnostic");
            }
        }
        RouteOutcome::Report(report)
    }
}
