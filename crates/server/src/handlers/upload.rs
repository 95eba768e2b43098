//! Handlers for uploading a product photo and reading back its listings.

use super::{read_image_field, wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::{ResultsResponse, UploadResponse};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use prodmatch::{keyword_match, pipeline::KeywordMatch, MatchError};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

/// Stores an uploaded photo, searches eBay with keywords derived from it and
/// saves the listings found.
///
/// When anything fails after the image row was created, the row and the
/// stored file are removed again before the error is returned.
pub async fn upload_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, AppError> {
    let image = read_image_field(multipart).await?;

    let image_dir = app_state.product_image_dir();
    tokio::fs::create_dir_all(&image_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create '{}': {e}", image_dir.display()))?;

    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension());
    let file_path = image_dir.join(&file_name);
    tokio::fs::write(&file_path, &image.bytes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write '{}': {e}", file_path.display()))?;

    let checksum = format!("{:x}", md5::compute(&image.bytes));
    let relative_path = format!("product_images/{file_name}");
    let record = match app_state
        .sqlite_provider
        .create_product_image(&relative_path, image.file_name.as_deref(), &checksum)
        .await
    {
        Ok(record) => record,
        Err(e) => {
            remove_stored_file(&file_path).await;
            return Err(e.into());
        }
    };

    let outcome = match_and_store(&app_state, record.id, &image.bytes).await;
    let matched = match outcome {
        Ok(matched) => matched,
        Err(e) => {
            error!(image_id = record.id, "Upload failed, rolling back: {e}");
            if let Err(cleanup) = app_state.sqlite_provider.delete_product_image(record.id).await {
                error!(image_id = record.id, "Failed to delete image row: {cleanup}");
            }
            remove_stored_file(&file_path).await;
            return Err(e.into());
        }
    };

    info!(
        image_id = record.id,
        "Saved {} listings for query '{}'.",
        matched.listings.len(),
        matched.query.raw
    );

    let debug_info = json!({
        "image_path": record.image_path,
        "checksum": record.checksum,
        "annotations": matched.annotations,
    });
    let response = UploadResponse {
        image_id: record.id,
        query: matched.query,
        listings: matched.listings,
    };

    Ok(wrap_response(response, debug_params, Some(debug_info)))
}

async fn match_and_store(
    app_state: &AppState,
    image_id: i64,
    bytes: &[u8],
) -> Result<KeywordMatch, MatchError> {
    let collaborators = &app_state.collaborators;
    let matched = keyword_match(
        collaborators.vision.as_ref(),
        collaborators.marketplace.as_ref(),
        bytes,
        &app_state.config.matching,
    )
    .await?;
    app_state
        .sqlite_provider
        .insert_listings(image_id, &matched.listings)
        .await?;
    Ok(matched)
}

async fn remove_stored_file(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        error!("Failed to remove '{}': {e}", path.display());
    }
}

/// Returns an uploaded image together with the listings saved for it.
pub async fn results_handler(
    State(app_state): State<AppState>,
    Path(image_id): Path<i64>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<ResultsResponse>>, AppError> {
    let image = app_state
        .sqlite_provider
        .get_product_image(image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product image {image_id} not found.")))?;
    let listings = app_state
        .sqlite_provider
        .listings_for_image(image_id)
        .await?;

    let debug_info = json!({ "listing_count": listings.len() });
    Ok(wrap_response(
        ResultsResponse { image, listings },
        debug_params,
        Some(debug_info),
    ))
}
