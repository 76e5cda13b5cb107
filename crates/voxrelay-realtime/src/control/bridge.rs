//! Control bridge: resolves a device's producer and pushes a command to it.

use std::sync::Arc;

use tracing::{info, warn};

use voxrelay_core::error::{AppError, ErrorKind};
use voxrelay_core::result::AppResult;
use voxrelay_core::types::DeviceKey;

use crate::connection::authenticator::TokenAuthenticator;
use crate::connection::handle::Outbound;
use crate::message::types::ControlCommand;
use crate::metrics::RelayMetrics;
use crate::registry::RelayRegistry;

/// Delivers admin commands to producer connections.
///
/// Only producers are ever targeted; subscriber connections have no path
/// into this type.
#[derive(Debug)]
pub struct ControlBridge {
    authenticator: Arc<TokenAuthenticator>,
    registry: Arc<RelayRegistry>,
    metrics: Arc<RelayMetrics>,
}

impl ControlBridge {
    /// Creates a bridge over the shared registry.
    pub fn new(
        authenticator: Arc<TokenAuthenticator>,
        registry: Arc<RelayRegistry>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            authenticator,
            registry,
            metrics,
        }
    }

    /// Sends `command` to the current producer of `device_key`.
    ///
    /// Returns once the producer's transport has accepted the message. Any
    /// acknowledgment from the device arrives later as a separate report.
    pub fn deliver(
        &self,
        device_key: &str,
        token: Option<&str>,
        command: &ControlCommand,
    ) -> AppResult<()> {
        self.authenticator.verify_token(token)?;
        let key = DeviceKey::parse(device_key)
            .map_err(|e| AppError::validation(format!("Invalid device key: {}", e.message)))?;

        let producer = self.registry.current_producer(&key).ok_or_else(|| {
            AppError::device_offline(format!("Device '{key}' is not connected"))
        })?;

        let payload = serde_json::to_string(command)?;
        producer
            .send(Outbound::Text(payload))
            .map_err(|e| match e.kind {
                ErrorKind::TransportClosed => {
                    AppError::device_offline(format!("Device '{key}' is not connected"))
                }
                _ => {
                    warn!(device_key = %key, error = %e, "Control message not accepted");
                    AppError::delivery(format!("Failed to deliver command to '{key}': {e}"))
                }
            })?;

        self.metrics.control_sent();
        info!(
            device_key = %key,
            conn_id = %producer.id,
            operation = command.operation(),
            "Control command delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use voxrelay_core::config::AuthConfig;

    use crate::connection::handle::{ConnectionHandle, Role};

    fn bridge() -> (ControlBridge, Arc<RelayRegistry>) {
        let authenticator = Arc::new(TokenAuthenticator::new(&AuthConfig {
            tokens: vec!["secret".to_string()],
        }));
        let registry = Arc::new(RelayRegistry::new());
        let bridge = ControlBridge::new(
            authenticator,
            registry.clone(),
            Arc::new(RelayMetrics::new()),
        );
        (bridge, registry)
    }

    fn command() -> ControlCommand {
        ControlCommand::SetWifi {
            ssid: "lab".to_string(),
            pass: "p4ssword".to_string(),
            apply: true,
        }
    }

    fn attach(
        registry: &RelayRegistry,
        role: Role,
        buffer: usize,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<Outbound>) {
        let key = DeviceKey::parse("dev1").unwrap();
        let (handle, rx) = ConnectionHandle::new(role, key.clone(), buffer);
        let handle = Arc::new(handle);
        match role {
            Role::Producer => {
                registry.register_producer(&key, &handle);
            }
            Role::Subscriber => {
                registry.register_listener(&key, &handle);
            }
        }
        (handle, rx)
    }

    #[test]
    fn test_rejects_bad_token_before_lookup() {
        let (bridge, _registry) = bridge();
        let err = bridge.deliver("dev1", Some("nope"), &command()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        let err = bridge.deliver("dev1", None, &command()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_blank_key_is_validation_error() {
        let (bridge, _registry) = bridge();
        let err = bridge.deliver("  ", Some("secret"), &command()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_offline_without_producer() {
        let (bridge, registry) = bridge();
        let (_listener, mut lrx) = attach(&registry, Role::Subscriber, 4);

        let err = bridge
            .deliver("dev1", Some("secret"), &command())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceOffline);
        assert!(lrx.try_recv().is_err());
    }

    #[test]
    fn test_delivers_exactly_one_structured_message() {
        let (bridge, registry) = bridge();
        let (_producer, mut rx) = attach(&registry, Role::Producer, 4);

        bridge.deliver("dev1", Some("secret"), &command()).unwrap();

        let Outbound::Text(text) = rx.try_recv().unwrap() else {
            panic!("expected a text message");
        };
        let sent: ControlCommand = serde_json::from_str(&text).unwrap();
        assert_eq!(sent, command());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_producer_is_offline() {
        let (bridge, registry) = bridge();
        let (_producer, rx) = attach(&registry, Role::Producer, 4);
        drop(rx);

        let err = bridge
            .deliver("dev1", Some("secret"), &command())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DeviceOffline);
    }

    #[test]
    fn test_full_queue_is_delivery_failure() {
        let (bridge, registry) = bridge();
        let (producer, _rx) = attach(&registry, Role::Producer, 1);
        producer.send(Outbound::Ping).unwrap();

        let err = bridge
            .deliver("dev1", Some("secret"), &command())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Delivery);
    }
}
