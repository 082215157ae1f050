//! Structure shape validation.
//!
//! Pure and deterministic; run on every create and on every update that
//! supplies a new structure, always before any write.

use crate::error::{DomainError, Result};

/// Verifies a candidate matrix is non-empty and perfectly square, returning
/// the normalized size (row count).
///
/// Fails with [`DomainError::EmptyStructure`] on zero rows, and with
/// [`DomainError::NotSquare`] on the first row whose length differs from the
/// row count.
pub fn validate_square<T>(rows: &[Vec<T>]) -> Result<usize> {
    if rows.is_empty() {
        return Err(DomainError::EmptyStructure);
    }
    let expected = rows.len();
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(DomainError::NotSquare {
                row,
                actual: cells.len(),
                expected,
            });
        }
    }
    Ok(expected)
}
