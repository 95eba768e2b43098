use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prodmatch::{ErrorKind, MatchError};
use serde_json::json;
use tracing::{error, warn};

/// Shown to clients when Google Vision or eBay fails. Details go to the log.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "The image could not be matched right now. Please try again later.";

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from `prodmatch` and its providers.
    Match(MatchError),
    /// A malformed request that never reached the matching pipeline.
    BadRequest(String),
    NotFound(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        AppError::Match(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Match(err) => match err.kind() {
                ErrorKind::UpstreamFailure => {
                    error!("Upstream service failed: {:?}", err);
                    (
                        StatusCode::BAD_GATEWAY,
                        UPSTREAM_FAILURE_MESSAGE.to_string(),
                    )
                }
                ErrorKind::InvalidInput => {
                    warn!("Rejected request: {}", err);
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Internal => {
                    error!("Internal error: {:?}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal server error occurred.".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => {
                warn!("Bad request: {msg}");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
