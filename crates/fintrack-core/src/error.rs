use fintrack_domain::DateWindowError;
use thiserror::Error;

/// Failures reported by a [`TemplateStore`](crate::TemplateStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Store rejected write: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid window: {0}")]
    InvalidWindow(#[from] DateWindowError),
}
