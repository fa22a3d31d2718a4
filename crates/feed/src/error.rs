use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine error: {0}")]
    EngineError(#[from] tournament::EngineError),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
