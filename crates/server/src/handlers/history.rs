use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::HistoryParams;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use prodmatch::providers::db::records::VisionCall;
use serde_json::json;

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Lists the most recent vision calls, newest first.
pub async fn history_handler(
    State(app_state): State<AppState>,
    Query(params): Query<HistoryParams>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Vec<VisionCall>>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let calls = app_state.sqlite_provider.list_vision_calls(limit).await?;

    let debug_info = json!({ "limit": limit });
    Ok(wrap_response(calls, debug_params, Some(debug_info)))
}

/// Returns one vision call including the raw service response.
pub async fn vision_call_handler(
    State(app_state): State<AppState>,
    Path(call_id): Path<i64>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<VisionCall>>, AppError> {
    let call = app_state
        .sqlite_provider
        .get_vision_call(call_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vision call {call_id} not found.")))?;
    Ok(wrap_response(call, debug_params, None))
}
