use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Package not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}
