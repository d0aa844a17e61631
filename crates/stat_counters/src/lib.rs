//! Statistic Counter Grids
//!
//! Dense two-dimensional accumulation surfaces used by the profiling code to
//! collect per-stage values keyed by a spatial position:
//!
//! - [`CounterGrid2D`] - a single `num_x × num_y` surface
//! - [`CounterGrid2DSet`] - one named surface per counter type, all sharing
//!   the same extents
//!
//! Cells are addressed row-major, so `set[counter][y][x]` reads naturally at
//! call sites.
//!
//! # Example
//!
//! ```rust
//! use stat_counters::CounterGrid2DSet;
//!
//! let mut set = CounterGrid2DSet::<f64>::new(["parse", "filter"], 4, 2);
//! set[1][1][3] += 2.5;
//! set.grid_mut(1).add(0, 0, 1.0);
//!
//! assert_eq!(set.totals(), vec![0.0, 3.5]);
//! ```

mod error;
mod grid;

pub use error::{CounterError, CounterResult};
pub use grid::{CounterGrid2D, CounterGrid2DSet, CounterValue};
