//! Error types shared across the threat globe crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlobeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type GlobeResult<T> = Result<T, GlobeError>;
