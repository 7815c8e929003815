//! Error types for Folio.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {}. Supported types: {supported}", path.display())]
    UnsupportedFormat { path: PathBuf, supported: String },

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Vectorizer has not been fitted on any documents yet")]
    ModelNotReady,

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;
