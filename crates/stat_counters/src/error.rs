//! Error types for counter grids.

use thiserror::Error;

/// Errors raised when combining or loading counter grids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterError {
    /// Two grids with different extents were combined
    #[error("Grid extent mismatch: expected {expected_x}x{expected_y}, got {actual_x}x{actual_y}")]
    ExtentMismatch {
        expected_x: usize,
        expected_y: usize,
        actual_x: usize,
        actual_y: usize,
    },

    /// Two counter sets with a different number of counter types were combined
    #[error("Counter type mismatch: expected {expected} counter types, got {actual}")]
    CounterTypeMismatch { expected: usize, actual: usize },

    /// A loaded grid does not hold exactly `num_x * num_y` cells
    #[error("Cell count mismatch: {num_x}x{num_y} grid with {cells} cells")]
    CellCountMismatch {
        num_x: usize,
        num_y: usize,
        cells: usize,
    },

    /// A loaded set does not name every grid exactly once
    #[error("Name count mismatch: {names} names for {grids} grids")]
    NameCountMismatch { names: usize, grids: usize },
}

/// Result type for counter grid operations.
pub type CounterResult<T> = Result<T, CounterError>;
