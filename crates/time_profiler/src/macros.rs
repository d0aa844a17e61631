//! Call-site macros
//!
//! Pipeline code instruments itself through these macros so that a build
//! without profiling features carries no instrumentation at all. What each
//! macro expands to depends on the build's [`ProfilingMode`](crate::ProfilingMode):
//!
//! | macro                                | scalar                  | extended                       | disabled |
//! |--------------------------------------|-------------------------|--------------------------------|----------|
//! | `profiler_start!(p, s)`              | `p.start(s)`            | `p.start(s)`                   | nothing  |
//! | `profiler_stop!(p)`                  | `p.stop()`              | `p.stop()`                     | nothing  |
//! | `profiler_accum_and_start_new_set!`  | `p.transition(s)`       | `p.count(s, (0, 0, 0))`        | nothing  |
//! | `profiler_scope_and_stage!(p, s)`    | [`StageScope`](crate::StageScope) | nothing              | nothing  |
//! | `profiler_scope_and_stage_ext!`      | [`StageScope`](crate::StageScope) | [`SpatialScope`](crate::SpatialScope) | nothing |
//!
//! `profiler_scope_and_stage_ext!(p, s, unit, geometry)` keys the spatial
//! guard by `SelectedAxes::coordinate(&unit, &geometry)`.
//!
//! The last three macros also accept a leading literal `0` or `1` that
//! switches that one call site off or on within the build's mode, e.g.
//! `profiler_scope_and_stage!(0, p, s)` expands to nothing in every mode.
//!
//! The scope macros take the profiler as an identifier bound to
//! `&mut` profiler and rebind that identifier to the guard for the rest of
//! the enclosing block, so later code (and nested scopes) keep using the same
//! name while the guard is alive.

#[cfg(any(feature = "time-profiling", feature = "time-profiling-extended"))]
#[macro_export]
macro_rules! profiler_start {
    ($profiler:expr, $stage:expr) => {
        $profiler.start($stage)
    };
}

#[cfg(not(any(feature = "time-profiling", feature = "time-profiling-extended")))]
#[macro_export]
macro_rules! profiler_start {
    ($profiler:expr, $stage:expr) => {};
}

#[cfg(any(feature = "time-profiling", feature = "time-profiling-extended"))]
#[macro_export]
macro_rules! profiler_stop {
    ($profiler:expr) => {
        $profiler.stop()
    };
}

#[cfg(not(any(feature = "time-profiling", feature = "time-profiling-extended")))]
#[macro_export]
macro_rules! profiler_stop {
    ($profiler:expr) => {};
}

#[cfg(feature = "time-profiling")]
#[macro_export]
macro_rules! profiler_accum_and_start_new_set {
    (0, $profiler:expr, $stage:expr) => {};
    (1, $profiler:expr, $stage:expr) => {
        $crate::profiler_accum_and_start_new_set!($profiler, $stage)
    };
    ($profiler:expr, $stage:expr) => {
        $profiler.transition($stage)
    };
}

#[cfg(all(feature = "time-profiling-extended", not(feature = "time-profiling")))]
#[macro_export]
macro_rules! profiler_accum_and_start_new_set {
    (0, $profiler:expr, $stage:expr) => {};
    (1, $profiler:expr, $stage:expr) => {
        $crate::profiler_accum_and_start_new_set!($profiler, $stage)
    };
    ($profiler:expr, $stage:expr) => {
        $profiler.count($stage, $crate::Coord::default())
    };
}

#[cfg(not(any(feature = "time-profiling", feature = "time-profiling-extended")))]
#[macro_export]
macro_rules! profiler_accum_and_start_new_set {
    (0, $profiler:expr, $stage:expr) => {};
    (1, $profiler:expr, $stage:expr) => {};
    ($profiler:expr, $stage:expr) => {};
}

#[cfg(feature = "time-profiling")]
#[macro_export]
macro_rules! profiler_scope_and_stage {
    (0, $profiler:ident, $stage:expr) => {};
    (1, $profiler:ident, $stage:expr) => {
        $crate::profiler_scope_and_stage!($profiler, $stage);
    };
    ($profiler:ident, $stage:expr) => {
        let mut __stage_scope = $crate::StageScope::enter(&mut *$profiler, $stage);
        #[allow(unused_variables)]
        let $profiler = &mut *__stage_scope;
    };
}

#[cfg(not(feature = "time-profiling"))]
#[macro_export]
macro_rules! profiler_scope_and_stage {
    (0, $profiler:ident, $stage:expr) => {};
    (1, $profiler:ident, $stage:expr) => {};
    ($profiler:ident, $stage:expr) => {};
}

#[cfg(feature = "time-profiling")]
#[macro_export]
macro_rules! profiler_scope_and_stage_ext {
    (0, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {};
    (1, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {
        $crate::profiler_scope_and_stage_ext!($profiler, $stage, $unit, $geometry);
    };
    ($profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {
        let _ = (&$unit, &$geometry);
        $crate::profiler_scope_and_stage!($profiler, $stage);
    };
}

#[cfg(all(feature = "time-profiling-extended", not(feature = "time-profiling")))]
#[macro_export]
macro_rules! profiler_scope_and_stage_ext {
    (0, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {};
    (1, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {
        $crate::profiler_scope_and_stage_ext!($profiler, $stage, $unit, $geometry);
    };
    ($profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {
        let mut __spatial_scope = $crate::SpatialScope::enter(
            &mut *$profiler,
            $stage,
            <$crate::SelectedAxes as $crate::CoordinateAxes>::coordinate(&$unit, &$geometry),
        );
        #[allow(unused_variables)]
        let $profiler = &mut *__spatial_scope;
    };
}

#[cfg(not(any(feature = "time-profiling", feature = "time-profiling-extended")))]
#[macro_export]
macro_rules! profiler_scope_and_stage_ext {
    (0, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {};
    (1, $profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {};
    ($profiler:ident, $stage:expr, $unit:expr, $geometry:expr) => {};
}
