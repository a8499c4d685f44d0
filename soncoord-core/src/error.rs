//! Errors of the library.
use thiserror::Error;

/// Errors of the library.
#[derive(Debug, Error)]
pub enum SoncoordError {
    /// A record value was requested with the wrong type.
    #[error("Record value type mismatch: expected {0}")]
    RecordValueTypeError(String),

    /// A record key was not found.
    #[error("Record key not found: {0}")]
    RecordKeyError(String),

    /// A lookup table file had an unexpected shape.
    #[error("Malformed lookup table: {0}")]
    LookupTableError(String),
}
