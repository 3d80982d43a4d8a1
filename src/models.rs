//! Data models for the trace visualizer.
//!
//! This module contains the core data structures used throughout
//! the application for representing trace intervals and summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work an interval represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseType {
    /// Computation phase
    Comp,
    /// Communication phase
    Comm,
    /// Any tag the instrumentation emitted that we don't recognize
    Unknown,
}

impl fmt::Display for PhaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseType::Comp => write!(f, "COMP"),
            PhaseType::Comm => write!(f, "COMM"),
            PhaseType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<&str> for PhaseType {
    fn from(s: &str) -> Self {
        match s.trim() {
            "COMP" => PhaseType::Comp,
            "COMM" => PhaseType::Comm,
            _ => PhaseType::Unknown,
        }
    }
}

impl PhaseType {
    /// Returns the fill color for this phase as RGB.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            PhaseType::Comp => (0x2c, 0xa0, 0x2c),
            PhaseType::Comm => (0xd6, 0x27, 0x28),
            PhaseType::Unknown => (0x80, 0x80, 0x80),
        }
    }

    /// Returns the fill color as a `#rrggbb` string.
    #[allow(dead_code)] // Utility for non-plotters consumers
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// One interval as recorded by a process on its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Rank that wrote the row.
    pub rank: u32,
    /// Phase of the interval.
    pub phase: PhaseType,
    /// Start time in seconds, process-local clock.
    pub start: f64,
    /// End time in seconds, process-local clock.
    pub end: f64,
}

impl TraceRecord {
    pub fn new(rank: u32, phase: PhaseType, start: f64, end: f64) -> Self {
        Self {
            rank,
            phase,
            start,
            end,
        }
    }

    /// Interval length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// An interval rebased so its rank's earliest event sits at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub rank: u32,
    pub phase: PhaseType,
    /// Seconds since the rank's first observed event.
    pub start: f64,
    /// Seconds since the rank's first observed event.
    pub end: f64,
}

impl NormalizedRecord {
    /// Interval length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Per-rank totals of time spent in each phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseStats {
    /// Rank these totals belong to.
    pub rank: u32,
    /// Display label ("Master" or "Worker <n>").
    pub label: String,
    /// Number of intervals recorded.
    pub records: usize,
    /// Seconds spent computing.
    pub comp_seconds: f64,
    /// Seconds spent communicating.
    pub comm_seconds: f64,
    /// Seconds in intervals with an unrecognized tag.
    pub unknown_seconds: f64,
    /// Latest normalized end time.
    pub span_seconds: f64,
    /// Raw clock value subtracted during normalization.
    pub clock_offset: f64,
}

impl PhaseStats {
    /// Share of the accounted time spent communicating, in percent.
    pub fn comm_ratio(&self) -> f64 {
        let total = self.comp_seconds + self.comm_seconds + self.unknown_seconds;
        if total > 0.0 {
            self.comm_seconds / total * 100.0
        } else {
            0.0
        }
    }
}

/// A source that was rejected during ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSource {
    /// File name or label of the source.
    pub name: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Metadata about a summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Directory that was searched for logs.
    pub directory: String,
    /// File-name pattern used for discovery.
    pub pattern: String,
    /// Number of sources ingested successfully.
    pub files_loaded: usize,
    /// Sources that were skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files_skipped: Vec<SkippedSource>,
    /// Number of ranks with at least one interval.
    pub ranks: usize,
    /// Total intervals in the timeline.
    pub total_records: usize,
}

/// The complete phase summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: ReportMetadata,
    /// Phase types in legend order.
    pub phases: Vec<PhaseType>,
    /// Per-rank totals, ranks ascending.
    pub ranks: Vec<PhaseStats>,
}
