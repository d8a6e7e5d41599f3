use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("log not found: {0}")]
    NotFound(String),
    #[error("invalid log: {0}")]
    Validation(String),
    #[error("failed to write log collection")]
    StorageWrite(#[from] std::io::Error),
    #[error("failed to encode log collection")]
    Encode(#[from] serde_json::Error),
}
