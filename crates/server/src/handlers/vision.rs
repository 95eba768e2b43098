//! Handler for the reverse-image lookup page.

use super::{read_image_field, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::TestVisionResponse;
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use prodmatch::{providers::db::records::NewVisionCall, reverse_image_report, MatchError};
use serde_json::json;
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// Runs a photo through the vision service, identifies eBay listings among
/// the pages showing it and records the call in the history.
///
/// The upload only lives in a temporary file for the duration of the request.
pub async fn test_vision_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<TestVisionResponse>>, AppError> {
    let image = read_image_field(multipart).await?;

    let mut temp_file = tempfile::Builder::new()
        .prefix("test-vision-")
        .suffix(&format!(".{}", image.extension()))
        .tempfile()
        .map_err(|e| anyhow::anyhow!("Failed to create temporary file: {e}"))?;
    temp_file
        .write_all(&image.bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write temporary file: {e}"))?;
    let bytes = tokio::fs::read(temp_file.path())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read temporary file: {e}"))?;

    let collaborators = &app_state.collaborators;
    let started = Instant::now();
    let matched = reverse_image_report(
        collaborators.vision.as_ref(),
        collaborators.item_details.as_ref(),
        collaborators.reachability.as_ref(),
        &bytes,
        &app_state.config.report.options,
    )
    .await?;
    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

    let call = NewVisionCall {
        image_name: image
            .file_name
            .clone()
            .unwrap_or_else(|| "upload".to_string()),
        search_query: matched.report.query.raw.clone(),
        annotations: matched.annotations,
        listings: matched.report.marketplace_listings.clone(),
        raw_response: serde_json::to_value(&matched.vision).map_err(MatchError::from)?,
        duration_ms,
    };
    let call_id = app_state.sqlite_provider.record_vision_call(&call).await?;
    info!(call_id, duration_ms, "Recorded vision call.");

    let debug_info = json!({
        "temp_file": temp_file.path().display().to_string(),
        "annotations": call.annotations,
    });
    let response = TestVisionResponse {
        call_id,
        duration_ms,
        report: matched.report,
    };

    Ok(wrap_response(response, debug_params, Some(debug_info)))
}
