//! Stage Time Profiling
//!
//! Low-overhead measurement of where a decoding pipeline spends its
//! wall-clock time:
//!
//! - [`ScalarProfiler`] accumulates time per pipeline [`Stage`]
//! - [`SpatialProfiler`] additionally keys time by an `(x, y, z)` coordinate
//!   (picture type, CTU position or block shape)
//! - [`StageScope`] and [`SpatialScope`] switch stages for the extent of a
//!   block and restore the previous stage on exit
//! - [`StageSummary`] formats accumulated time as a `stage | time(ms) | %`
//!   table
//!
//! Time is attributed retroactively: each call charges the interval since
//! the previous call to the stage that was active during it.
//!
//! # Feature Flags
//!
//! - `time-profiling` (default): scalar profiling through the call-site macros
//! - `time-profiling-extended`: spatial profiling; pick the coordinate
//!   meaning with `axes-pic-types`, `axes-ctus-in-pic` or `axes-cu-shapes`
//!
//! With neither enabled the call-site macros expand to nothing. The profiler
//! types themselves are always available.
//!
//! # Example
//!
//! ```rust
//! use time_profiler::{ScalarProfiler, Stage, StageScope};
//!
//! // One profiler per worker thread.
//! let workers: Vec<ScalarProfiler> = (0..2)
//!     .map(|_| {
//!         let mut profiler = ScalarProfiler::new();
//!         profiler.start(Stage::NaluSlicePicHl);
//!         {
//!             let _scope = StageScope::enter(&mut profiler, Stage::MotComp);
//!             // ... motion compensation ...
//!         }
//!         profiler.stop();
//!         profiler
//!     })
//!     .collect();
//!
//! // Combine after the workers are done and print the report.
//! let total: ScalarProfiler = workers.iter().sum();
//! println!("{}", total);
//! ```
//!
//! # Modules
//!
//! - [`stage`] - stage registry and [`define_stages!`]
//! - [`scalar`] - per-stage profiler
//! - [`spatial`] - per-stage, per-coordinate profiler
//! - [`scope`] - scope guards
//! - [`report`] - report rows and table formatting
//! - [`axes`] - coordinate axes for spatial profiling
//! - [`config`] - profiling mode and grid configuration
//! - [`clock`] - time sources

pub mod axes;
pub mod clock;
pub mod config;
mod error;
mod macros;
pub mod report;
pub mod scalar;
pub mod scope;
pub mod spatial;
pub mod stage;

pub use axes::{
    AxesKind, BlockShapeAxes, CoordinateAxes, CtuPositionAxes, PicTypeAxes, PictureGeometry,
    SelectedAxes, WorkUnit, MAX_CTU_SIZE_LOG2,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ProfilingMode, SpatialConfig};
pub use error::{ProfilerError, ProfilerResult};
pub use report::{StageRow, StageSummary};
pub use scalar::ScalarProfiler;
pub use scope::{SpatialScope, StageScope};
pub use spatial::{Coord, GridExtents, SpatialProfiler};
pub use stage::{Stage, StageSet};

/// Re-export of the counter grids backing [`SpatialProfiler`].
pub use stat_counters::{CounterGrid2D, CounterGrid2DSet};
