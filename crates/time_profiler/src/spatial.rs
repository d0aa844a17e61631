//! Spatial stage profiler
//!
//! Same retroactive attribution as the [scalar profiler](crate::scalar), but
//! each interval is keyed by `(stage, x, y, z)`: `z` selects one of several
//! independent counter sets and `(x, y)` addresses a cell of that stage's
//! grid inside the set.
//!
//! What the coordinates mean (picture type, CTU position, block shape) is
//! decided by the [`CoordinateAxes`](crate::CoordinateAxes) chosen at build
//! time; the accumulation itself does not care.

use crate::clock::{interval_ms, Clock, MonotonicClock};
use crate::config::SpatialConfig;
use crate::error::{ProfilerError, ProfilerResult};
use crate::report::StageSummary;
use crate::stage::{Stage, StageSet};
use serde::{Deserialize, Serialize};
use stat_counters::CounterGrid2DSet;
use std::fmt;
use std::time::Instant;

/// A coordinate triple addressing one cell of the spatial grids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Coord {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

impl From<(u32, u32, u32)> for Coord {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self { x, y, z }
    }
}

/// Extents of the spatial grids: `num_z` layers of `num_x × num_y` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridExtents {
    pub num_x: u32,
    pub num_y: u32,
    pub num_z: u32,
}

impl GridExtents {
    /// Create extents. Zero sizes are raised to one.
    pub const fn new(num_x: u32, num_y: u32, num_z: u32) -> Self {
        Self {
            num_x: if num_x == 0 { 1 } else { num_x },
            num_y: if num_y == 0 { 1 } else { num_y },
            num_z: if num_z == 0 { 1 } else { num_z },
        }
    }

    /// Whether `coord` lies inside these extents.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.num_x && coord.y < self.num_y && coord.z < self.num_z
    }
}

impl Default for GridExtents {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl fmt::Display for GridExtents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.num_x, self.num_y, self.num_z)
    }
}

/// Accumulator of stage durations over a coordinate grid.
///
/// Coordinates outside the extents given at construction are a caller
/// error and panic when their interval is flushed.
#[derive(Debug, Clone)]
pub struct SpatialProfiler<S: StageSet = Stage, C: Clock = MonotonicClock> {
    clock: C,
    previous: Instant,
    start_time: Instant,
    stage: S,
    current: Coord,
    extents: GridExtents,
    counters: Vec<CounterGrid2DSet<f64>>,
}

impl<S: StageSet> SpatialProfiler<S, MonotonicClock> {
    /// Create a profiler on the process monotonic clock.
    pub fn new(extents: GridExtents) -> Self {
        Self::with_clock(extents, MonotonicClock)
    }

    /// Create a profiler sized by `config`.
    pub fn from_config(config: &SpatialConfig) -> Self {
        Self::new(config.extents())
    }
}

impl<S: StageSet, C: Clock> SpatialProfiler<S, C> {
    /// Create a profiler reading time from `clock`.
    ///
    /// Allocates `num_z` counter sets with one grid per stage (`VOID`
    /// included). The current key starts at `(VOID, 0, 0, 0)`.
    pub fn with_clock(extents: GridExtents, clock: C) -> Self {
        let extents = GridExtents::new(extents.num_x, extents.num_y, extents.num_z);
        let names: Vec<&'static str> = S::ALL.iter().map(|s| s.name()).collect();
        let counters = (0..extents.num_z)
            .map(|_| {
                CounterGrid2DSet::new(names.iter().copied(), extents.num_x as usize, extents.num_y as usize)
            })
            .collect();

        tracing::debug!(
            target: "time_profiler::spatial",
            extents = %extents,
            stages = S::COUNT + 1,
            "spatial profiler created"
        );

        let now = clock.now();
        Self {
            clock,
            previous: now,
            start_time: now,
            stage: S::VOID,
            current: Coord::default(),
            extents,
            counters,
        }
    }

    /// Charge the time since the last call to the current `(stage, x, y, z)`
    /// cell, then move to `stage` at `coord`.
    #[inline]
    pub fn count(&mut self, stage: S, coord: Coord) {
        let now = self.clock.now();
        let cur = self.current;
        self.counters[cur.z as usize][self.stage.index()][cur.y as usize][cur.x as usize] +=
            interval_ms(self.previous, now);
        self.previous = now;
        self.stage = stage;
        self.current = coord;
    }

    /// Re-anchor on `stage` without charging the open interval. The current
    /// coordinate is kept.
    pub fn start(&mut self, stage: S) {
        self.previous = self.clock.now();
        self.stage = stage;

        tracing::trace!(
            target: "time_profiler::spatial",
            stage = stage.name(),
            "profiler started"
        );
    }

    /// Flush the open interval into the current cell without moving.
    pub fn stop(&mut self) {
        let (stage, coord) = (self.stage, self.current);
        self.count(stage, coord);

        tracing::debug!(
            target: "time_profiler::spatial",
            stage = stage.name(),
            "profiler stopped"
        );
    }

    /// The active stage.
    #[inline]
    pub fn current_stage(&self) -> S {
        self.stage
    }

    /// The active coordinate.
    #[inline]
    pub fn current_coord(&self) -> Coord {
        self.current
    }

    /// `x` of the active coordinate.
    #[inline]
    pub fn cur_x(&self) -> u32 {
        self.current.x
    }

    /// `y` of the active coordinate.
    #[inline]
    pub fn cur_y(&self) -> u32 {
        self.current.y
    }

    /// `z` (layer) of the active coordinate.
    #[inline]
    pub fn cur_z(&self) -> u32 {
        self.current.z
    }

    /// Number of grids per layer (every stage plus `VOID`).
    pub fn num_stages(&self) -> usize {
        self.counters
            .first()
            .map(CounterGrid2DSet::num_cnt_types)
            .unwrap_or(S::COUNT + 1)
    }

    /// Extents every layer's grids were allocated with.
    pub fn extents(&self) -> GridExtents {
        self.extents
    }

    /// The raw counter sets, one per `z` layer.
    pub fn counter_sets(&self) -> &[CounterGrid2DSet<f64>] {
        &self.counters
    }

    /// The counter set of layer `z`.
    pub fn counter_set(&self, z: u32) -> &CounterGrid2DSet<f64> {
        &self.counters[z as usize]
    }

    /// Accumulated time of `stage` at `coord`, in milliseconds.
    pub fn cell_ms(&self, stage: S, coord: Coord) -> f64 {
        self.counters[coord.z as usize][stage.index()].get(coord.x as usize, coord.y as usize)
    }

    /// Accumulated time of `stage` over all cells of layer `z`.
    pub fn stage_total_ms(&self, z: u32, stage: S) -> f64 {
        self.counters[z as usize][stage.index()].total()
    }

    /// Tracked time of layer `z`, excluding `VOID`.
    pub fn layer_total_ms(&self, z: u32) -> f64 {
        S::real().iter().map(|&s| self.stage_total_ms(z, s)).sum()
    }

    /// Tracked time over every layer, excluding `VOID`.
    pub fn tracked_total_ms(&self) -> f64 {
        (0..self.extents.num_z).map(|z| self.layer_total_ms(z)).sum()
    }

    /// Per-stage durations with every cell of every layer collapsed,
    /// indexed like [`ScalarProfiler::durations`](crate::ScalarProfiler::durations).
    pub fn to_scalar_durations(&self) -> Vec<f64> {
        let mut durations = vec![0.0; S::COUNT + 1];
        for set in &self.counters {
            for (dst, total) in durations.iter_mut().zip(set.totals()) {
                *dst += total;
            }
        }
        durations
    }

    /// Per-stage breakdown over all layers.
    pub fn summary(&self) -> StageSummary {
        StageSummary::from_durations::<S>(&self.to_scalar_durations())
    }

    /// Per-stage breakdown of layer `z`.
    pub fn layer_summary(&self, z: u32) -> StageSummary {
        StageSummary::from_durations::<S>(&self.counters[z as usize].totals())
    }

    /// Add every cell of `other` into this profiler.
    ///
    /// Fails when the two profilers have different extents. The current key
    /// and timestamps of `self` are left untouched.
    pub fn merge<C2: Clock>(&mut self, other: &SpatialProfiler<S, C2>) -> ProfilerResult<&mut Self> {
        if self.extents != other.extents {
            return Err(ProfilerError::ExtentMismatch {
                expected: self.extents,
                actual: other.extents,
            });
        }

        for (dst, src) in self.counters.iter_mut().zip(&other.counters) {
            dst.merge(src)?;
        }

        tracing::debug!(
            target: "time_profiler::spatial",
            merged_ms = other.tracked_total_ms(),
            tracked_ms = self.tracked_total_ms(),
            "profiler merged"
        );
        Ok(self)
    }

    /// Time since the profiler was created, in milliseconds.
    pub fn elapsed_since_creation_ms(&self) -> f64 {
        interval_ms(self.start_time, self.clock.now())
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.counters.iter_mut().for_each(CounterGrid2DSet::clear);
    }
}

/// Writes each layer's nonzero stage grids, one cell per column. The `VOID`
/// grid is never written.
impl<S: StageSet, C: Clock> fmt::Display for SpatialProfiler<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (z, set) in self.counters.iter().enumerate() {
            writeln!(f, "layer {} ({:.1} ms tracked)", z, self.layer_total_ms(z as u32))?;
            for (name, grid) in set.iter().take(S::COUNT) {
                if grid.is_zero() {
                    continue;
                }
                writeln!(f, "{}:", name)?;
                write!(f, "{:.1}", grid)?;
            }
        }
        Ok(())
    }
}
