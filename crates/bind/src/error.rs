//! Error types for the binding layer.
//!
//! Absent optional values (no action, no destination, no color) are
//! `Ok(None)`, never errors; everything here reports a failed
//! operation that left prior state intact.

use thiserror::Error;
use vellum_core::PdfError;

/// Failures surfaced across the host boundary.
#[derive(Error, Debug)]
pub enum BindError {
    /// A setter or constructor received a value object of the wrong
    /// wrapper kind or shape. The mutation is never partially applied.
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// A stream operation was invoked outside its valid state.
    #[error("invalid state: {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Data shape outside the recognized closed set, e.g. a color
    /// component array of unexpected arity.
    #[error("unsupported encoding: {0} color components")]
    UnsupportedEncoding(usize),

    /// Failure during background serialization; delivered through the
    /// completion channel, never thrown from `submit`.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A parent-bounded handle was resolved after its parent (or an
    /// ancestor) was released.
    #[error("stale handle: parent wrapper was released")]
    StaleHandle,

    #[error(transparent)]
    Engine(#[from] PdfError),
}

/// Convenience Result type alias for BindError.
pub type Result<T> = std::result::Result<T, BindError>;
