use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("No platform data directory available")]
    NoDataDir,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
