//! Scalar stage profiler
//!
//! Accumulates wall-clock time per stage using retroactive attribution: the
//! time elapsed since the previous call is charged to whichever stage was
//! active during that interval, never to the incoming one.
//!
//! The profiler holds a single active-stage slot, not a stack. Nesting is
//! provided by [`StageScope`](crate::StageScope), which saves and restores
//! the active stage.
//!
//! # Example
//!
//! ```rust
//! use time_profiler::{ScalarProfiler, Stage};
//!
//! let mut profiler: ScalarProfiler = ScalarProfiler::new();
//! profiler.start(Stage::IntraPred);
//! // ... intra prediction ...
//! profiler.transition(Stage::MotComp);
//! // ... motion compensation ...
//! profiler.transition(Stage::Void);
//!
//! println!("{}", profiler.summary());
//! ```

use crate::clock::{interval_ms, Clock, MonotonicClock};
use crate::report::StageSummary;
use crate::stage::{Stage, StageSet};
use std::fmt;
use std::io;
use std::iter::Sum;
use std::ops::AddAssign;
use std::time::Instant;

/// Per-context accumulator of stage durations.
///
/// Owned and mutated by one execution context. Profilers from different
/// contexts are combined with [`merge`](Self::merge) once those contexts
/// have finished.
#[derive(Debug, Clone)]
pub struct ScalarProfiler<S: StageSet = Stage, C: Clock = MonotonicClock> {
    clock: C,
    previous: Instant,
    start_time: Instant,
    stage: S,
    /// One slot per stage, `VOID` last
    durations: Vec<f64>,
}

impl<S: StageSet> ScalarProfiler<S, MonotonicClock> {
    /// Create a profiler on the process monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock)
    }
}

impl<S: StageSet> Default for ScalarProfiler<S, MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StageSet, C: Clock> ScalarProfiler<S, C> {
    /// Create a profiler reading time from `clock`.
    ///
    /// The active stage is `VOID` until the first `start` or `transition`.
    pub fn with_clock(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            previous: now,
            start_time: now,
            stage: S::VOID,
            durations: vec![0.0; S::COUNT + 1],
        }
    }

    /// Charge the time since the last call to the active stage, then make
    /// `stage` active.
    #[inline]
    pub fn transition(&mut self, stage: S) {
        let now = self.clock.now();
        self.durations[self.stage.index()] += interval_ms(self.previous, now);
        self.previous = now;
        self.stage = stage;
    }

    /// Re-anchor on `stage` without charging the open interval to anyone.
    pub fn start(&mut self, stage: S) {
        self.previous = self.clock.now();
        self.stage = stage;

        tracing::trace!(
            target: "time_profiler::scalar",
            stage = stage.name(),
            "profiler started"
        );
    }

    /// Flush the open interval into the active stage, leaving it active.
    pub fn stop(&mut self) {
        let stage = self.stage;
        self.transition(stage);

        tracing::debug!(
            target: "time_profiler::scalar",
            stage = stage.name(),
            tracked_ms = self.tracked_total_ms(),
            "profiler stopped"
        );
    }

    /// The active stage.
    #[inline]
    pub fn current_stage(&self) -> S {
        self.stage
    }

    /// The clock this profiler reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Add every duration of `other` into this profiler.
    ///
    /// Commutative and associative; the active stage and timestamps of
    /// `self` are left untouched.
    pub fn merge<C2: Clock>(&mut self, other: &ScalarProfiler<S, C2>) -> &mut Self {
        for (dst, src) in self.durations.iter_mut().zip(&other.durations) {
            *dst += *src;
        }

        tracing::debug!(
            target: "time_profiler::scalar",
            merged_ms = other.tracked_total_ms(),
            tracked_ms = self.tracked_total_ms(),
            "profiler merged"
        );
        self
    }

    /// Accumulated time of `stage`, in milliseconds.
    #[inline]
    pub fn duration_ms(&self, stage: S) -> f64 {
        self.durations[stage.index()]
    }

    /// All accumulated durations indexed by stage, `VOID` last.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Sum over all real stages. Time attributed to `VOID` is excluded.
    pub fn tracked_total_ms(&self) -> f64 {
        self.durations[..S::COUNT].iter().sum()
    }

    /// Time since the profiler was created, in milliseconds.
    pub fn elapsed_since_creation_ms(&self) -> f64 {
        interval_ms(self.start_time, self.clock.now())
    }

    /// Zero every accumulated duration.
    pub fn reset(&mut self) {
        self.durations.fill(0.0);
    }

    /// Per-stage breakdown of the tracked time.
    pub fn summary(&self) -> StageSummary {
        StageSummary::from_durations::<S>(&self.durations)
    }

    /// Write the report table to `out`.
    pub fn write_report<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        self.summary().write_to(out)
    }
}

impl<S: StageSet, C: Clock, C2: Clock> AddAssign<&ScalarProfiler<S, C2>> for ScalarProfiler<S, C> {
    fn add_assign(&mut self, other: &ScalarProfiler<S, C2>) {
        self.merge(other);
    }
}

impl<'a, S: StageSet, C: Clock + 'a> Sum<&'a ScalarProfiler<S, C>> for ScalarProfiler<S, MonotonicClock> {
    fn sum<I: Iterator<Item = &'a ScalarProfiler<S, C>>>(iter: I) -> Self {
        iter.fold(Self::new(), |mut acc, p| {
            acc.merge(p);
            acc
        })
    }
}

impl<S: StageSet, C: Clock> fmt::Display for ScalarProfiler<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    fn manual() -> (ManualClock, ScalarProfiler<Stage, ManualClock>) {
        let clock = ManualClock::new();
        let profiler = ScalarProfiler::with_clock(clock.clone());
        (clock, profiler)
    }

    #[test]
    fn test_initial_state() {
        let (_, profiler) = manual();
        assert_eq!(profiler.current_stage(), Stage::Void);
        assert_eq!(profiler.durations().len(), Stage::COUNT + 1);
        assert_eq!(profiler.tracked_total_ms(), 0.0);
    }

    #[test]
    fn test_retroactive_attribution() {
        let (clock, mut profiler) = manual();
        profiler.start(Stage::IntraPred);
        clock.advance_ms(10);
        profiler.transition(Stage::MotComp);
        clock.advance_ms(5);
        profiler.transition(Stage::Void);

        assert_eq!(profiler.duration_ms(Stage::IntraPred), 10.0);
        assert_eq!(profiler.duration_ms(Stage::MotComp), 5.0);
        assert_eq!(profiler.tracked_total_ms(), 15.0);
        assert_eq!(profiler.current_stage(), Stage::Void);
    }

    #[test]
    fn test_time_before_first_transition_goes_to_void() {
        let (clock, mut profiler) = manual();
        clock.advance_ms(7);
        profiler.transition(Stage::Alf);
        clock.advance_ms(3);
        profiler.transition(Stage::Void);

        assert_eq!(profiler.duration_ms(Stage::Void), 7.0);
        assert_eq!(profiler.duration_ms(Stage::Alf), 3.0);
        assert_eq!(profiler.tracked_total_ms(), 3.0);
    }

    #[test]
    fn test_start_discards_open_interval() {
        let (clock, mut profiler) = manual();
        profiler.start(Stage::Sao);
        clock.advance_ms(4);
        profiler.start(Stage::DbFilter);
        clock.advance_ms(6);
        profiler.stop();

        assert_eq!(profiler.duration_ms(Stage::Sao), 0.0);
        assert_eq!(profiler.duration_ms(Stage::DbFilter), 6.0);
    }

    #[test]
    fn test_stop_keeps_active_stage() {
        let (clock, mut profiler) = manual();
        profiler.start(Stage::ParseResiduals);
        clock.advance_ms(2);
        profiler.stop();
        clock.advance_ms(3);
        profiler.stop();

        assert_eq!(profiler.current_stage(), Stage::ParseResiduals);
        assert_eq!(profiler.duration_ms(Stage::ParseResiduals), 5.0);
    }

    #[test]
    fn test_merge_adds_elementwise() {
        let (clock_a, mut a) = manual();
        a.start(Stage::IntraPred);
        clock_a.advance_ms(4);
        a.stop();

        let (clock_b, mut b) = manual();
        b.start(Stage::IntraPred);
        clock_b.advance_ms(6);
        b.transition(Stage::Alf);
        clock_b.advance_ms(1);
        b.stop();

        a.merge(&b);
        assert_eq!(a.duration_ms(Stage::IntraPred), 10.0);
        assert_eq!(a.duration_ms(Stage::Alf), 1.0);
        assert_eq!(a.tracked_total_ms(), 11.0);
    }

    #[test]
    fn test_add_assign_and_sum() {
        let (clock, mut a) = manual();
        a.start(Stage::MotComp);
        clock.advance_ms(2);
        a.stop();
        let b = a.clone();

        let total: ScalarProfiler = [&a, &b].into_iter().sum();
        assert_eq!(total.duration_ms(Stage::MotComp), 4.0);

        a += &b;
        assert_eq!(a.duration_ms(Stage::MotComp), 4.0);
    }

    #[test]
    fn test_reset() {
        let (clock, mut profiler) = manual();
        profiler.start(Stage::Reshaper);
        clock.advance_ms(9);
        profiler.stop();
        profiler.reset();

        assert_eq!(profiler.tracked_total_ms(), 0.0);
        assert_eq!(profiler.current_stage(), Stage::Reshaper);
    }

    #[test]
    fn test_elapsed_since_creation() {
        let (clock, profiler) = manual();
        clock.advance_ms(12);
        assert_eq!(profiler.elapsed_since_creation_ms(), 12.0);
    }

    #[test]
    fn test_report_single_stage() {
        let (clock, mut profiler) = manual();
        profiler.start(Stage::ITransRec);
        clock.advance_ms(8);
        profiler.stop();

        let summary = profiler.summary();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].percentage, 100.0);
        assert_eq!(summary.total_percentage(), 100.0);
    }

    fn stage_strategy() -> impl Strategy<Value = Stage> {
        (0..Stage::COUNT).prop_map(|i| Stage::from_index(i).unwrap())
    }

    proptest! {
        #[test]
        fn prop_durations_cover_elapsed_time(
            steps in prop::collection::vec((0u64..50, stage_strategy()), 1..40)
        ) {
            let (clock, mut profiler) = manual();
            profiler.start(steps[0].1);
            let mut elapsed = 0u64;
            for &(ms, stage) in &steps[1..] {
                clock.advance_ms(ms);
                elapsed += ms;
                profiler.transition(stage);
            }

            prop_assert_eq!(profiler.duration_ms(Stage::Void), 0.0);
            prop_assert_eq!(profiler.tracked_total_ms(), elapsed as f64);
        }

        #[test]
        fn prop_merge_commutative(
            a_ms in prop::collection::vec(0u64..100, Stage::COUNT),
            b_ms in prop::collection::vec(0u64..100, Stage::COUNT),
        ) {
            let a = profiler_from(&a_ms);
            let b = profiler_from(&b_ms);

            let mut ab = a.clone();
            ab.merge(&b);
            let mut ba = b.clone();
            ba.merge(&a);

            prop_assert_eq!(ab.durations(), ba.durations());
            for stage in Stage::real() {
                prop_assert_eq!(
                    ab.duration_ms(*stage),
                    a.duration_ms(*stage) + b.duration_ms(*stage)
                );
            }
        }

        #[test]
        fn prop_merge_associative(
            a_ms in prop::collection::vec(0u64..100, Stage::COUNT),
            b_ms in prop::collection::vec(0u64..100, Stage::COUNT),
            c_ms in prop::collection::vec(0u64..100, Stage::COUNT),
        ) {
            let a = profiler_from(&a_ms);
            let b = profiler_from(&b_ms);
            let c = profiler_from(&c_ms);

            let mut left = a.clone();
            left.merge(&b).merge(&c);

            let mut bc = b.clone();
            bc.merge(&c);
            let mut right = a.clone();
            right.merge(&bc);

            prop_assert_eq!(left.durations(), right.durations());
        }
    }

    /// Profiler that spent `ms[i]` milliseconds in stage `i`.
    fn profiler_from(ms: &[u64]) -> ScalarProfiler<Stage, ManualClock> {
        let (clock, mut profiler) = manual();
        for (i, &ms) in ms.iter().enumerate() {
            profiler.start(Stage::from_index(i).unwrap());
            clock.advance_ms(ms);
            profiler.stop();
        }
        profiler
    }
}
