//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `prodmatch-server`.
//! The handlers are split into sub-modules by the page they serve.

pub mod general;
pub mod history;
pub mod upload;
pub mod vision;

pub use general::*;
pub use history::*;
pub use upload::*;
pub use vision::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use axum_extra::extract::Multipart;
use serde_json::Value;
use tracing::{info, warn};

/// The multipart field carrying the product photo.
pub const IMAGE_FIELD: &str = "image";

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}

/// An image received through a multipart form.
pub(crate) struct UploadedImage {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    /// The lowercase extension of the client file name, `jpg` when unusable.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "jpg".to_string())
    }
}

/// Reads the `image` part of a multipart form, ignoring any other part.
pub(crate) async fn read_image_field(mut multipart: Multipart) -> Result<UploadedImage, AppError> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != IMAGE_FIELD {
            warn!("Ignoring unknown multipart field: {}", name);
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read image: {e}")))?
            .to_vec();
        info!(
            "Received image '{}' ({} bytes).",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );
        image = Some(UploadedImage { bytes, file_name });
    }

    let image =
        image.ok_or_else(|| AppError::BadRequest("No image file was provided.".to_string()))?;
    if image.bytes.is_empty() {
        return Err(AppError::BadRequest("The uploaded image is empty.".to_string()));
    }
    Ok(image)
}
