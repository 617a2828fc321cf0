//! Error types for the vellum engine core.

use thiserror::Error;

/// Primary error type for engine-side PDF operations.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("PDF object not found: {0} {1} R")]
    ObjectNotFound(u32, u32),

    #[error("unknown stream filter: {0}")]
    UnknownFilter(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("encode error: {0}")]
    EncodeError(String),

    #[error("unknown protection option: {0}")]
    UnknownProtectionOption(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
