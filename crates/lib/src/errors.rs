use thiserror::Error;

/// The coarse category of a failure, used by callers to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The vision or marketplace service failed or returned an error.
    UpstreamFailure,
    /// The request was rejected before any external call was made.
    InvalidInput,
    /// A requested record or item does not exist.
    NotFound,
    /// Local failures such as storage or serialization errors.
    Internal,
}

/// Custom error types for the matching pipeline.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Vision service request failed: {0}")]
    Vision(String),
    #[error("Marketplace request failed: {0}")]
    Marketplace(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::Vision(_) | MatchError::Marketplace(_) => ErrorKind::UpstreamFailure,
            MatchError::InvalidInput(_) => ErrorKind::InvalidInput,
            MatchError::NotFound(_) => ErrorKind::NotFound,
            MatchError::ReqwestClientBuild(_)
            | MatchError::Database(_)
            | MatchError::Serialization(_) => ErrorKind::Internal,
        }
    }
}
