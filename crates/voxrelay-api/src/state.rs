//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use voxrelay_core::config::AppConfig;
use voxrelay_realtime::RelayEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Relay engine (registry, router, control bridge)
    pub realtime: Arc<RelayEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state for a running engine.
    pub fn new(config: AppConfig, realtime: Arc<RelayEngine>) -> Self {
        Self {
            config: Arc::new(config),
            realtime,
            started_at: Instant::now(),
        }
    }
}
