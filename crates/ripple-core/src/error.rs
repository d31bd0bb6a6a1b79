//! Error types for ripple-rs.

use thiserror::Error;

/// The main error type for ripple-rs operations.
#[derive(Error, Debug)]
pub enum RippleError {
    /// A mirror plane normal could not be normalized.
    #[error("degenerate mirror normal (zero length)")]
    DegenerateNormal,

    /// A render target resolution was rejected.
    #[error("invalid render target resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for ripple-rs operations.
pub type Result<T> = std::result::Result<T, RippleError>;
