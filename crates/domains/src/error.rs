//! # DomainError
//!
//! Centralized error handling for the Peblob domain.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Resource not found (e.g., Peblob with an unknown id)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// A candidate structure has zero rows
    #[error("structure cannot be empty")]
    EmptyStructure,

    /// A candidate structure is not a square matrix
    #[error("structure must be square: row {row} has {actual} cells, expected {expected}")]
    NotSquare {
        row: usize,
        actual: usize,
        expected: usize,
    },

    /// A color channel falls outside [0, 255]
    #[error("channel '{channel}' out of range: {value} (expected 0-255)")]
    ChannelOutOfRange { channel: char, value: i64 },

    /// Requested grid size falls outside the allowed bounds
    #[error("size must be between {min} and {max}, got {size}")]
    SizeOutOfRange { size: usize, min: usize, max: usize },

    /// Cell indices exceed the grid; reported as a not-found condition
    #[error("no cell at row={row}, col={col} for a peblob of size {size}")]
    CellOutOfBounds { row: usize, col: usize, size: usize },

    /// Remaining input validation failures (missing name, inverted ranges)
    #[error("validation error: {0}")]
    Validation(String),

    /// Infrastructure failure in a repository backend
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// True for the errors surfaced to API callers as not-found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound(..) | DomainError::CellOutOfBounds { .. }
        )
    }
}

/// A specialized Result type for Peblob domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
