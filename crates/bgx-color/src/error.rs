//! Error types for color operations.
//!
//! Soft numerical conditions (stability epsilon substitutions, optimizer
//! non-convergence) are not errors. They are logged and, for the gamut
//! mapper, reported on [`GamutMapReport`](crate::GamutMapReport).

use thiserror::Error;

/// Color operation error.
///
/// Covers the hard failure modes of the translation pipeline:
/// - Unknown viewing-condition names
/// - Invalid input values (NaN, Inf, negative factors)
/// - Matrix singularity when deriving encoding matrices
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    /// Viewing-condition name is not one of the registered presets.
    #[error("unknown viewing conditions: {0:?} (expected dark, neutral or light)")]
    UnknownConditions(String),

    /// Input value is invalid (NaN, Inf, out of expected range).
    #[error("invalid input value: {0}")]
    InvalidValue(String),

    /// Matrix operation failed (singular, numerical instability).
    #[error("matrix error: {0}")]
    MatrixError(String),
}

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;
