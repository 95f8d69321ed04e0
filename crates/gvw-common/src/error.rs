//! Error types for GVW

use thiserror::Error;

/// Result type alias for GVW operations
pub type Result<T> = std::result::Result<T, GvwError>;

/// Main error type for GVW
///
/// Coercion failures are deliberately absent: cell-level type coercion
/// degrades to null and never surfaces as an error.
#[derive(Error, Debug)]
pub enum GvwError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
