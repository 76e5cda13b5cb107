//! Shared-secret authentication configuration.

use serde::{Deserialize, Serialize};

/// Allow-set of tokens accepted from devices, listeners and admin callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Valid tokens. Blank entries are ignored.
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl AuthConfig {
    /// Iterates the configured tokens, skipping blank entries.
    pub fn valid_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }
}
