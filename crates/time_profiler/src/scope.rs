//! Scoped stage guards
//!
//! A guard switches the profiler to a new stage when created and switches it
//! back to the previous stage when dropped, on every exit path including
//! early return, `?` propagation and unwinding.
//!
//! Guards hold the profiler's mutable borrow and dereference to it, so an
//! inner scope must be entered through the outer guard:
//!
//! ```rust
//! use time_profiler::{ScalarProfiler, Stage, StageScope};
//!
//! let mut profiler: ScalarProfiler = ScalarProfiler::new();
//! profiler.start(Stage::Other);
//! {
//!     let mut outer = StageScope::enter(&mut profiler, Stage::ControlParseDeriveLl);
//!     // ... parsing ...
//!     {
//!         let _inner = StageScope::enter(&mut outer, Stage::IntraPred);
//!         // ... prediction, charged to P_INTRAPRED only ...
//!     }
//!     // ... back in parsing ...
//! }
//! profiler.stop();
//! ```
//!
//! The borrow checker therefore rules out non-LIFO release: the outer guard
//! cannot be dropped while the inner one still borrows it.

use crate::clock::{Clock, MonotonicClock};
use crate::scalar::ScalarProfiler;
use crate::spatial::{Coord, SpatialProfiler};
use crate::stage::{Stage, StageSet};
use std::ops::{Deref, DerefMut};

/// Scope guard for a [`ScalarProfiler`].
#[must_use = "the stage ends as soon as the guard is dropped"]
pub struct StageScope<'a, S: StageSet = Stage, C: Clock = MonotonicClock> {
    profiler: &'a mut ScalarProfiler<S, C>,
    previous: S,
}

impl<'a, S: StageSet, C: Clock> StageScope<'a, S, C> {
    /// Remember the active stage and transition to `stage`.
    #[inline]
    pub fn enter(profiler: &'a mut ScalarProfiler<S, C>, stage: S) -> Self {
        let previous = profiler.current_stage();
        profiler.transition(stage);
        Self { profiler, previous }
    }

    /// The stage restored when this guard is dropped.
    pub fn previous_stage(&self) -> S {
        self.previous
    }
}

impl<S: StageSet, C: Clock> Drop for StageScope<'_, S, C> {
    #[inline]
    fn drop(&mut self) {
        self.profiler.transition(self.previous);
    }
}

impl<S: StageSet, C: Clock> Deref for StageScope<'_, S, C> {
    type Target = ScalarProfiler<S, C>;

    fn deref(&self) -> &Self::Target {
        self.profiler
    }
}

impl<S: StageSet, C: Clock> DerefMut for StageScope<'_, S, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.profiler
    }
}

/// Scope guard for a [`SpatialProfiler`].
#[must_use = "the stage ends as soon as the guard is dropped"]
pub struct SpatialScope<'a, S: StageSet = Stage, C: Clock = MonotonicClock> {
    profiler: &'a mut SpatialProfiler<S, C>,
    previous_stage: S,
    previous_coord: Coord,
}

impl<'a, S: StageSet, C: Clock> SpatialScope<'a, S, C> {
    /// Remember the active key and move to `stage` at `coord`.
    #[inline]
    pub fn enter(profiler: &'a mut SpatialProfiler<S, C>, stage: S, coord: Coord) -> Self {
        let previous_stage = profiler.current_stage();
        let previous_coord = profiler.current_coord();
        profiler.count(stage, coord);
        Self {
            profiler,
            previous_stage,
            previous_coord,
        }
    }

    /// The key restored when this guard is dropped.
    pub fn previous(&self) -> (S, Coord) {
        (self.previous_stage, self.previous_coord)
    }
}

impl<S: StageSet, C: Clock> Drop for SpatialScope<'_, S, C> {
    #[inline]
    fn drop(&mut self) {
        self.profiler.count(self.previous_stage, self.previous_coord);
    }
}

impl<S: StageSet, C: Clock> Deref for SpatialScope<'_, S, C> {
    type Target = SpatialProfiler<S, C>;

    fn deref(&self) -> &Self::Target {
        self.profiler
    }
}

impl<S: StageSet, C: Clock> DerefMut for SpatialScope<'_, S, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.profiler
    }
}
