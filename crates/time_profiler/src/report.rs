//! Stage time reports
//!
//! Turns accumulated per-stage durations into a table of
//! `stage | time(ms) | %` rows followed by a `TOTAL` row.

use crate::error::ProfilerResult;
use crate::stage::StageSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// One reported stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRow {
    /// Display name of the stage
    pub name: String,
    /// Accumulated time in milliseconds
    pub time_ms: f64,
    /// Share of the tracked total, in percent
    pub percentage: f64,
}

/// Per-stage breakdown of tracked time.
///
/// Only stages with nonzero time appear, in registry order. The `void`
/// sentinel never contributes to the rows or the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    /// Nonzero stages in registry order
    pub rows: Vec<StageRow>,
    /// Sum over all real stages, in milliseconds
    pub total_ms: f64,
}

impl StageSummary {
    /// Build a summary from a duration slice indexed by stage.
    ///
    /// `durations` holds one entry per stage of `S`; the entry at
    /// `S::VOID.index()` (and anything after it) is ignored.
    pub fn from_durations<S: StageSet>(durations: &[f64]) -> Self {
        let total_ms: f64 = durations.iter().take(S::COUNT).sum();

        let rows: Vec<StageRow> = S::real()
            .iter()
            .zip(durations)
            .filter(|&(_, &time_ms)| time_ms != 0.0)
            .map(|(stage, &time_ms)| StageRow {
                name: stage.name().to_string(),
                time_ms,
                percentage: percentage(time_ms, total_ms),
            })
            .collect();

        tracing::trace!(
            target: "time_profiler::report",
            stages = rows.len(),
            total_ms = total_ms,
            "stage summary built"
        );

        Self { rows, total_ms }
    }

    /// Row for the stage named `name`, if it has nonzero time.
    pub fn row(&self, name: &str) -> Option<&StageRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Whether no stage has recorded any time.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Percentage shown on the `TOTAL` row: 100 when anything was tracked,
    /// otherwise 0.
    pub fn total_percentage(&self) -> f64 {
        if self.total_ms > 0.0 {
            100.0
        } else {
            0.0
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ProfilerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the text table to `out`.
    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

/// `time / total * 100`, or 0 when nothing was tracked.
fn percentage(time_ms: f64, total_ms: f64) -> f64 {
    if total_ms > 0.0 {
        time_ms / total_ms * 100.0
    } else {
        0.0
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Time column is as wide as the formatted total, plus one space.
        let time_width = (format!("{:.1}", self.total_ms).len() + 1).max("time(ms)".len() + 1);
        let pad = "";

        writeln!(f)?;
        writeln!(f, "{pad:10}{:<30}{:>time_width$}{:>10}", "stages", "time(ms)", "%")?;

        for row in &self.rows {
            writeln!(
                f,
                "{pad:10}{:<30}{:>time_width$.1}{:>10.1}",
                row.name, row.time_ms, row.percentage
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{pad:10}{:<30}{:>time_width$.1}{:>10.1}",
            "TOTAL",
            self.total_ms,
            self.total_percentage()
        )
    }
}
