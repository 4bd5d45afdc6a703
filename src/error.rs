#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Request cancelled")]
    Cancelled,
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Cancellation is its own outcome, never reported as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}
