//! Admin control handler: pushes a command to a device's producer.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use validator::Validate;

use voxrelay_core::error::AppError;

use crate::dto::request::{TokenQuery, WifiConfigRequest};
use crate::dto::response::{ApiResponse, ControlResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/devices/{device_key}/wifi?token={token}
///
/// 200 once the device's transport accepted the command, 400 on a malformed
/// body, 401 on a bad token, 409 when the device is offline, 500 when the
/// command could not be queued.
pub async fn set_wifi(
    State(state): State<AppState>,
    Path(device_key): Path<String>,
    Query(query): Query<TokenQuery>,
    body: Result<Json<WifiConfigRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ControlResponse>>, ApiError> {
    let token = query.token.as_deref();
    state.realtime.authenticator.verify_token(token)?;

    let Json(request) = body.map_err(|e| {
        AppError::validation(format!("Malformed request body: {}", e.body_text()))
    })?;
    request
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid Wi-Fi configuration: {e}")))?;

    let command = request.into_command();
    state.realtime.control.deliver(&device_key, token, &command)?;

    Ok(Json(ApiResponse::ok(ControlResponse {
        device_key,
        operation: command.operation().to_string(),
        delivered: true,
    })))
}
