//! Error types for raster-kml conversions.

use thiserror::Error;

/// Result type alias using ConvertError.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Primary error type for raster conversion operations.
///
/// Caller-input faults are detected eagerly, before any partial document is
/// assembled, and are never retried.
#[derive(Debug, Error)]
pub enum ConvertError {
    // === Caller input faults ===
    #[error("alpha must be between 0.0 and 1.0, got {0}")]
    InvalidAlpha(f64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid value range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("expected a number: {0}")]
    InvalidNumber(String),

    #[error("unknown color ramp: {0}")]
    UnknownRamp(String),

    #[error("requested format not supported: {0}")]
    UnsupportedFormat(String),

    // === Operational faults ===
    #[error("database error: {0}")]
    Database(String),

    #[error("raster load error: {0}")]
    Load(String),

    #[error("spatial reference lookup failed: {0}")]
    SridLookup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
