//! Control-message and inbound message type definitions.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A data message read from a connection, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// A text message (control acknowledgments, diagnostics).
    Text(String),
    /// A binary message (audio frames).
    Binary(Bytes),
}

/// Commands pushed from an administrator to a device's producer connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Replace the device's Wi-Fi credentials.
    SetWifi {
        /// Target network SSID.
        ssid: String,
        /// Target network passphrase.
        pass: String,
        /// Whether the device should reconnect immediately.
        apply: bool,
    },
}

impl ControlCommand {
    /// The wire `type` of this command.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SetWifi { .. } => "set_wifi",
        }
    }
}

/// Structured text messages reported by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceMessage {
    /// Result of applying a [`ControlCommand::SetWifi`].
    WifiAck {
        /// Whether the credentials were applied.
        ok: bool,
        /// SSID the device is now configured for.
        #[serde(default)]
        ssid: Option<String>,
        /// Optional failure detail.
        #[serde(default)]
        message: Option<String>,
    },
    /// Any other typed report; logged as a diagnostic.
    #[serde(other)]
    Diagnostic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_wifi_wire_shape() {
        let cmd = ControlCommand::SetWifi {
            ssid: "home".to_string(),
            pass: "hunter22".to_string(),
            apply: true,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(
            value,
            json!({"type": "set_wifi", "ssid": "home", "pass": "hunter22", "apply": true})
        );
        assert_eq!(cmd.operation(), "set_wifi");
    }

    #[test]
    fn test_parse_wifi_ack() {
        let msg: DeviceMessage =
            serde_json::from_str(r#"{"type":"wifi_ack","ok":true,"ssid":"home"}"#).unwrap();
        assert_eq!(
            msg,
            DeviceMessage::WifiAck {
                ok: true,
                ssid: Some("home".to_string()),
                message: None,
            }
        );
    }

    #[test]
    fn test_unknown_type_is_diagnostic() {
        let msg: DeviceMessage =
            serde_json::from_str(r#"{"type":"boot","fw":"1.2.0"}"#).unwrap();
        assert_eq!(msg, DeviceMessage::Diagnostic);
    }

    #[test]
    fn test_untyped_json_is_rejected() {
        assert!(serde_json::from_str::<DeviceMessage>(r#"{"ok":true}"#).is_err());
        assert!(serde_json::from_str::<DeviceMessage>("ON").is_err());
    }
}
