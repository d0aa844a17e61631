//! Error types for the profiler.
//!
//! Recording operations never fail. Errors only come from combining spatial
//! profilers and from parsing or validating configuration.

use crate::spatial::GridExtents;
use stat_counters::CounterError;
use thiserror::Error;

/// Errors that can occur outside the recording path.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Two spatial profilers with different grid extents were merged
    #[error("Grid extent mismatch: expected {expected}, got {actual}")]
    ExtentMismatch {
        expected: GridExtents,
        actual: GridExtents,
    },

    /// A profiling mode string could not be parsed
    #[error("Invalid profiling mode: {0}")]
    InvalidMode(String),

    /// Picture geometry that no grid can be sized for
    #[error("Invalid picture geometry: {0}")]
    InvalidGeometry(String),

    /// Failed to read or write JSON configuration or reports
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Underlying counter grids could not be combined
    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),
}

/// Result type for profiler operations.
pub type ProfilerResult<T> = Result<T, ProfilerError>;
