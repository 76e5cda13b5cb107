//! Route definitions for the VoxRelay HTTP surface.
//!
//! WebSocket endpoints live under `/ws`, the admin and health endpoints
//! under `/api`. Everything else falls through to a 404.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(device_routes());

    Router::new()
        .merge(ws_routes())
        .nest("/api", api_routes)
        .fallback(handlers::not_found)
        .with_state(state)
}

/// Producer and listener upgrades
fn ws_routes() -> Router<AppState> {
    Router::new()
        .route("/ws/device", get(handlers::ws::device_upgrade))
        .route("/ws/listen", get(handlers::ws::listen_upgrade))
}

/// Device status and control
fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices/{device_key}", get(handlers::device::device_status))
        .route("/devices/{device_key}/wifi", post(handlers::control::set_wifi))
}

/// Liveness and detailed health
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
