//! Error types shared across Retime crates.

use std::path::PathBuf;

/// Top-level error type for Retime operations.
#[derive(Debug, thiserror::Error)]
pub enum RetimeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Document error: {message}")]
    Document { message: String },

    #[error("Remap error: {message}")]
    Remap { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RetimeError.
pub type RetimeResult<T> = Result<T, RetimeError>;

impl RetimeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document {
            message: msg.into(),
        }
    }

    pub fn remap(msg: impl Into<String>) -> Self {
        Self::Remap {
            message: msg.into(),
        }
    }
}
