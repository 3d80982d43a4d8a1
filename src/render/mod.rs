//! Render plan for the Gantt chart.
//!
//! The plan is a flat, backend-independent list of bars plus a legend
//! deduplicated by first occurrence. [`chart`] draws it with plotters.

pub mod chart;

use crate::analysis::TimelineModel;
use crate::models::PhaseType;

pub use chart::{render_svg_file, ChartOptions};

/// One horizontal bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSpec {
    /// Row the bar sits on.
    pub rank: u32,
    pub phase: PhaseType,
    /// Normalized start.
    pub left: f64,
    /// Normalized duration.
    pub width: f64,
    pub color: (u8, u8, u8),
}

/// A legend entry, tied to the first bar drawn with its phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    pub phase: PhaseType,
    pub bar_index: usize,
    pub color: (u8, u8, u8),
}

/// Everything a chart backend needs to draw one timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    /// Bars in draw order: ranks ascending, then stored record order.
    pub bars: Vec<BarSpec>,
    pub legend: Vec<LegendEntry>,
    /// Row labels, ranks ascending.
    pub rows: Vec<(u32, String)>,
    /// Right edge of the data.
    pub x_max: f64,
}

impl RenderPlan {
    /// Lay out every record of the model.
    pub fn from_model(model: &TimelineModel) -> Self {
        let bars: Vec<BarSpec> = model
            .lanes()
            .iter()
            .flat_map(|lane| &lane.records)
            .map(|record| BarSpec {
                rank: record.rank,
                phase: record.phase,
                left: record.start,
                width: record.duration(),
                color: record.phase.rgb(),
            })
            .collect();

        let legend = legend_bar_indices(&bars)
            .into_iter()
            .map(|(phase, bar_index)| LegendEntry {
                phase,
                bar_index,
                color: phase.rgb(),
            })
            .collect();

        let rows = model
            .lanes()
            .iter()
            .map(|lane| (lane.rank, lane.label.clone()))
            .collect();

        Self {
            bars,
            legend,
            rows,
            x_max: model.max_end(),
        }
    }

    /// Returns the legend entry attached to a bar, if any.
    pub fn legend_for_bar(&self, bar_index: usize) -> Option<&LegendEntry> {
        self.legend.iter().find(|entry| entry.bar_index == bar_index)
    }

    /// Smallest and largest rank, if there are any rows.
    pub fn rank_bounds(&self) -> Option<(u32, u32)> {
        let first = self.rows.first()?.0;
        let last = self.rows.last()?.0;
        Some((first, last))
    }
}

/// For each distinct phase, the index of the first bar drawn with it.
///
/// Entries come out in first-occurrence order.
pub fn legend_bar_indices(bars: &[BarSpec]) -> Vec<(PhaseType, usize)> {
    let mut seen: Vec<(PhaseType, usize)> = Vec::new();

    for (idx, bar) in bars.iter().enumerate() {
        if !seen.iter().any(|(phase, _)| *phase == bar.phase) {
            seen.push((bar.phase, idx));
        }
    }

    seen
}
