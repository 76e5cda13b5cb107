//! Connection authentication: validates the device key and shared-secret
//! token supplied as query parameters.

use std::collections::HashSet;

use voxrelay_core::config::AuthConfig;
use voxrelay_core::error::AppError;
use voxrelay_core::types::DeviceKey;

use super::handle::Role;

/// Authenticated connection info, produced before the WebSocket upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedConnection {
    /// Device the connection is joining.
    pub device_key: DeviceKey,
    /// Role requested by the endpoint.
    pub role: Role,
}

/// Authenticates connections and admin calls against a token allow-set.
#[derive(Clone)]
pub struct TokenAuthenticator {
    tokens: HashSet<String>,
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthenticator")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl TokenAuthenticator {
    /// Creates an authenticator from the configured allow-set.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: config.valid_tokens().map(str::to_string).collect(),
        }
    }

    /// Checks that `token` is present and belongs to the allow-set.
    pub fn verify_token(&self, token: Option<&str>) -> Result<(), AppError> {
        let token = token.map(str::trim).unwrap_or_default();
        if token.is_empty() {
            return Err(AppError::authentication("Missing token"));
        }
        if !self.tokens.contains(token) {
            return Err(AppError::authentication("Invalid token"));
        }
        Ok(())
    }

    /// Authenticates a connection attempt for the given role.
    ///
    /// Runs once, before the upgrade; nothing is registered on failure.
    pub fn authenticate(
        &self,
        device_key: Option<&str>,
        token: Option<&str>,
        role: Role,
    ) -> Result<AuthenticatedConnection, AppError> {
        let device_key = DeviceKey::parse(device_key.unwrap_or_default())?;
        self.verify_token(token)?;
        Ok(AuthenticatedConnection { device_key, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxrelay_core::error::ErrorKind;

    fn authenticator() -> TokenAuthenticator {
        TokenAuthenticator::new(&AuthConfig {
            tokens: vec!["secret".to_string(), " ".to_string()],
        })
    }

    #[test]
    fn test_accepts_valid_key_and_token() {
        let auth = authenticator()
            .authenticate(Some("dev1"), Some("secret"), Role::Producer)
            .unwrap();
        assert_eq!(auth.device_key.as_str(), "dev1");
        assert_eq!(auth.role, Role::Producer);
    }

    #[test]
    fn test_rejects_missing_or_empty_key() {
        let authenticator = authenticator();
        for key in [None, Some(""), Some("  ")] {
            let err = authenticator
                .authenticate(key, Some("secret"), Role::Subscriber)
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }

    #[test]
    fn test_rejects_bad_tokens() {
        let authenticator = authenticator();
        for token in [None, Some(""), Some(" "), Some("wrong")] {
            let err = authenticator
                .authenticate(Some("dev1"), token, Role::Subscriber)
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }
}
