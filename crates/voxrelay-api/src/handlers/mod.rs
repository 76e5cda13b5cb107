//! Route handlers organized by domain.

pub mod control;
pub mod device;
pub mod health;
pub mod ws;

use voxrelay_core::error::AppError;

use crate::error::ApiError;

/// Fallback for unknown paths, including unknown WebSocket endpoints.
pub async fn not_found() -> ApiError {
    AppError::not_found("Unknown endpoint").into()
}
