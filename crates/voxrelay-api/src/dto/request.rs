//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use voxrelay_realtime::message::ControlCommand;

/// Query parameters carried by WebSocket upgrades.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Device key.
    pub key: Option<String>,
    /// Shared-secret token.
    pub token: Option<String>,
}

/// Query parameters carried by admin calls.
#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    /// Shared-secret token.
    pub token: Option<String>,
}

/// Body of a Wi-Fi reconfiguration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WifiConfigRequest {
    /// Target SSID (1–32 bytes).
    #[validate(length(min = 1, max = 32))]
    pub ssid: String,
    /// Passphrase; empty for open networks.
    #[serde(default)]
    #[validate(length(max = 63))]
    pub pass: String,
    /// Whether the device should switch networks immediately.
    #[serde(default = "default_apply")]
    pub apply: bool,
}

impl WifiConfigRequest {
    /// Converts the request into the command pushed to the device.
    pub fn into_command(self) -> ControlCommand {
        ControlCommand::SetWifi {
            ssid: self.ssid,
            pass: self.pass,
            apply: self.apply,
        }
    }
}

fn default_apply() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_validation() {
        let req: WifiConfigRequest = serde_json::from_str(r#"{"ssid":"home"}"#).unwrap();
        assert!(req.apply);
        assert!(req.pass.is_empty());
        assert!(req.validate().is_ok());

        let req: WifiConfigRequest = serde_json::from_str(r#"{"ssid":""}"#).unwrap();
        assert!(req.validate().is_err());

        let long = "x".repeat(33);
        let req: WifiConfigRequest =
            serde_json::from_str(&format!(r#"{{"ssid":"{long}"}}"#)).unwrap();
        assert!(req.validate().is_err());
    }
}
