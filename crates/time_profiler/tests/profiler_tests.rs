//! Integration tests for stage time profiling
//!
//! Simulates decoder worker threads driving the profilers through a
//! manually advanced clock, so every timing assertion is exact.

use std::sync::Once;
use std::thread;
use time_profiler::{
    BlockShapeAxes, Coord, CoordinateAxes, CtuPositionAxes, GridExtents, ManualClock,
    PictureGeometry, ScalarProfiler, SpatialProfiler, SpatialScope, Stage, StageScope, StageSet,
    StageSummary, WorkUnit,
};

static INIT: Once = Once::new();

/// Route profiler logs through the test writer; filter with `RUST_LOG`.
fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

type TestProfiler = ScalarProfiler<Stage, ManualClock>;

fn scalar() -> (ManualClock, TestProfiler) {
    init_logging();
    let clock = ManualClock::new();
    let profiler = ScalarProfiler::with_clock(clock.clone());
    (clock, profiler)
}

/// Decode one simulated CTU: parse, then predict and reconstruct nested
/// inside parsing, then filter.
fn decode_ctu(profiler: &mut TestProfiler, clock: &ManualClock, intra: bool) {
    let mut parse = StageScope::enter(&mut *profiler, Stage::ControlParseDeriveLl);
    clock.advance_ms(2);
    {
        let pred_stage = if intra { Stage::IntraPred } else { Stage::MotComp };
        let mut pred = StageScope::enter(&mut parse, pred_stage);
        clock.advance_ms(3);
        {
            let _rec = StageScope::enter(&mut pred, Stage::ITransRec);
            clock.advance_ms(1);
        }
    }
    clock.advance_ms(1);
    drop(parse);

    let _filter = StageScope::enter(&mut *profiler, Stage::DbFilter);
    clock.advance_ms(2);
}

#[test]
fn test_worked_scenario() {
    let (clock, mut profiler) = scalar();

    profiler.start(Stage::IntraPred);
    clock.advance_ms(10);
    profiler.transition(Stage::MotComp);
    clock.advance_ms(5);
    profiler.transition(Stage::Void);

    assert_eq!(profiler.duration_ms(Stage::IntraPred), 10.0);
    assert_eq!(profiler.duration_ms(Stage::MotComp), 5.0);
    assert_eq!(profiler.tracked_total_ms(), 15.0);

    let summary = profiler.summary();
    assert_eq!(summary.rows.len(), 2);
    assert_eq!(summary.rows[0].name, "P_INTRAPRED");
    assert_eq!(format!("{:.1}", summary.rows[0].time_ms), "10.0");
    assert_eq!(format!("{:.1}", summary.rows[0].percentage), "66.7");
    assert_eq!(summary.rows[1].name, "P_MOTCOMP");
    assert_eq!(format!("{:.1}", summary.rows[1].time_ms), "5.0");
    assert_eq!(format!("{:.1}", summary.rows[1].percentage), "33.3");
    assert_eq!(summary.total_ms, 15.0);
    assert_eq!(summary.total_percentage(), 100.0);

    let mut out = Vec::new();
    profiler.write_report(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let total_line = text.lines().find(|l| l.contains("TOTAL")).unwrap();
    assert!(total_line.contains("15.0"));
    assert!(total_line.contains("100.0"));
}

#[test]
fn test_zero_activity_report() {
    let (_, profiler) = scalar();

    let summary = profiler.summary();
    assert_eq!(summary.total_ms, 0.0);
    assert!(summary.is_empty());

    let text = profiler.to_string();
    assert!(text.contains("TOTAL"));
    assert!(!text.contains("NaN"));
    assert!(!text.contains("inf"));
}

#[test]
fn test_single_stage_reports_full_share() {
    let (clock, mut profiler) = scalar();
    profiler.start(Stage::Alf);
    clock.advance_ms(7);
    profiler.stop();

    let text = profiler.to_string();
    let alf_line = text.lines().find(|l| l.contains("P_ALF")).unwrap();
    assert!(alf_line.trim_end().ends_with("100.0"));
    let total_line = text.lines().find(|l| l.contains("TOTAL")).unwrap();
    assert!(total_line.trim_end().ends_with("100.0"));
}

#[test]
fn test_nesting_excludes_inner_time() {
    // outer Y over [t0, t3], inner X over [t1, t2]
    let (clock, mut profiler) = scalar();
    profiler.start(Stage::Void);
    {
        let mut outer = StageScope::enter(&mut profiler, Stage::NaluSlicePicHl);
        clock.advance_ms(4); // t1 - t0
        {
            let _inner = StageScope::enter(&mut outer, Stage::ParseResiduals);
            clock.advance_ms(9); // t2 - t1
        }
        clock.advance_ms(6); // t3 - t2
    }

    assert_eq!(profiler.duration_ms(Stage::ParseResiduals), 9.0);
    assert_eq!(profiler.duration_ms(Stage::NaluSlicePicHl), 10.0);
    assert_eq!(profiler.tracked_total_ms(), 19.0);
}

#[test]
fn test_simulated_ctu_decode() {
    let (clock, mut profiler) = scalar();
    profiler.start(Stage::Other);

    decode_ctu(&mut profiler, &clock, true);
    decode_ctu(&mut profiler, &clock, false);
    profiler.stop();

    assert_eq!(profiler.current_stage(), Stage::Other);
    assert_eq!(profiler.duration_ms(Stage::ControlParseDeriveLl), 6.0);
    assert_eq!(profiler.duration_ms(Stage::IntraPred), 3.0);
    assert_eq!(profiler.duration_ms(Stage::MotComp), 3.0);
    assert_eq!(profiler.duration_ms(Stage::ITransRec), 2.0);
    assert_eq!(profiler.duration_ms(Stage::DbFilter), 4.0);
    assert_eq!(profiler.tracked_total_ms(), clock.elapsed_ms());
}

#[test]
fn test_merge_worker_threads() {
    init_logging();

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            thread::spawn(move || {
                let clock = ManualClock::new();
                let mut profiler: TestProfiler = ScalarProfiler::with_clock(clock.clone());
                profiler.start(Stage::Other);
                for _ in 0..=worker {
                    decode_ctu(&mut profiler, &clock, worker % 2 == 0);
                }
                profiler.stop();
                profiler
            })
        })
        .collect();

    let workers: Vec<TestProfiler> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let mut combined: TestProfiler = ScalarProfiler::with_clock(ManualClock::new());
    for worker in &workers {
        combined.merge(worker);
    }

    for stage in Stage::real() {
        let expected: f64 = workers.iter().map(|w| w.duration_ms(*stage)).sum();
        assert_eq!(combined.duration_ms(*stage), expected, "stage {}", stage);
    }
    // 1 + 2 + 3 + 4 CTUs at 9ms each
    assert_eq!(combined.tracked_total_ms(), 90.0);

    let reversed = workers
        .iter()
        .rev()
        .fold(ScalarProfiler::with_clock(ManualClock::new()), |mut acc: TestProfiler, w| {
            acc.merge(w);
            acc
        });
    assert_eq!(reversed.durations(), combined.durations());
}

#[test]
fn test_spatial_attribution_to_previous_cell() {
    init_logging();
    let clock = ManualClock::new();
    let mut profiler: SpatialProfiler<Stage, ManualClock> =
        SpatialProfiler::with_clock(GridExtents::new(8, 8, 1), clock.clone());

    profiler.count(Stage::IntraPred, Coord::new(1, 2, 0));
    clock.advance_ms(5);
    profiler.count(Stage::MotComp, Coord::new(3, 4, 0));

    assert_eq!(profiler.cell_ms(Stage::IntraPred, Coord::new(1, 2, 0)), 5.0);
    assert_eq!(profiler.cell_ms(Stage::MotComp, Coord::new(3, 4, 0)), 0.0);
    assert_eq!(profiler.counter_set(0)[Stage::IntraPred.index()][2][1], 5.0);
}

#[test]
fn test_spatial_ctu_grid() {
    init_logging();
    let geometry = PictureGeometry::new(512, 256, 7);
    let clock = ManualClock::new();
    let mut profiler: SpatialProfiler<Stage, ManualClock> =
        SpatialProfiler::with_clock(CtuPositionAxes::extents(&geometry), clock.clone());
    assert_eq!(profiler.extents(), GridExtents::new(4, 2, 2));

    profiler.start(Stage::Other);
    for ctu_y in 0..2 {
        for ctu_x in 0..4 {
            let unit = WorkUnit::new(ctu_x * 128, ctu_y * 128, 128, 128).with_intra(ctu_x == 0);
            let coord = CtuPositionAxes::coordinate(&unit, &geometry);
            let _scope = SpatialScope::enter(&mut profiler, Stage::IntraPred, coord);
            clock.advance_ms(u64::from(ctu_x + 1));
        }
    }
    profiler.stop();

    // Column 0 is intra (z = 0), the rest inter (z = 1).
    assert_eq!(profiler.layer_total_ms(0), 2.0);
    assert_eq!(profiler.layer_total_ms(1), 18.0);
    assert_eq!(profiler.cell_ms(Stage::IntraPred, Coord::new(3, 1, 1)), 4.0);
    assert_eq!(profiler.current_stage(), Stage::Other);
}

#[test]
fn test_spatial_block_shapes_and_merge() {
    init_logging();
    let geometry = PictureGeometry::new(256, 256, 6);
    let extents = BlockShapeAxes::extents(&geometry);

    let run = |width: u32, height: u32, ms: u64| {
        let clock = ManualClock::new();
        let mut profiler: SpatialProfiler<Stage, ManualClock> =
            SpatialProfiler::with_clock(extents, clock.clone());
        let unit = WorkUnit::new(0, 0, width, height);
        {
            let _scope = SpatialScope::enter(
                &mut profiler,
                Stage::MotComp,
                BlockShapeAxes::coordinate(&unit, &geometry),
            );
            clock.advance_ms(ms);
        }
        profiler
    };

    let mut a = run(16, 8, 3);
    let b = run(16, 8, 2);
    let c = run(64, 64, 5);
    a.merge(&b).unwrap().merge(&c).unwrap();

    assert_eq!(a.cell_ms(Stage::MotComp, Coord::new(4, 3, 1)), 5.0);
    assert_eq!(a.cell_ms(Stage::MotComp, Coord::new(6, 6, 1)), 5.0);

    let summary: StageSummary = a.summary();
    assert_eq!(summary.total_ms, 10.0);
    assert_eq!(summary.row("P_MOTCOMP").unwrap().percentage, 100.0);
}
