//! # voxrelay-api
//!
//! HTTP layer for VoxRelay built on Axum.
//!
//! Provides the device and listener WebSocket endpoints, the admin control
//! endpoint, health and device status endpoints, middleware, DTOs, and error
//! mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
