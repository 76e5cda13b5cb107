//! Device status handler.

use axum::Json;
use axum::extract::{Path, Query, State};

use voxrelay_core::error::AppError;
use voxrelay_core::types::DeviceKey;

use crate::dto::request::TokenQuery;
use crate::dto::response::{ApiResponse, DeviceStatusResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/devices/{device_key}?token={token}
pub async fn device_status(
    State(state): State<AppState>,
    Path(device_key): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ApiResponse<DeviceStatusResponse>>, ApiError> {
    state
        .realtime
        .authenticator
        .verify_token(query.token.as_deref())?;
    let key = DeviceKey::parse(&device_key)
        .map_err(|e| AppError::validation(format!("Invalid device key: {}", e.message)))?;
    let registry = &state.realtime.registry;

    Ok(Json(ApiResponse::ok(DeviceStatusResponse {
        producer_online: registry.current_producer(&key).is_some(),
        listener_count: registry.listener_count(&key),
        device_key: key.to_string(),
    })))
}
