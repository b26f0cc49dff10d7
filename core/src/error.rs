//! Error types for the pmap-core library.
//!
//! Registry operations never fail; they report misses through `Option` and
//! empty results. These errors cover the ambient plumbing around it.

use thiserror::Error;

/// Result type alias for pmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or saving configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
