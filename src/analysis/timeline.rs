//! The normalized timeline handed to rendering.

use crate::models::{NormalizedRecord, PhaseType};
use std::collections::BTreeMap;

/// All intervals of one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankLane {
    pub rank: u32,
    /// "Master" for rank 0, "Worker <rank>" otherwise.
    pub label: String,
    /// Intervals in ingestion order (not sorted by time).
    pub records: Vec<NormalizedRecord>,
}

/// Display label for a rank.
pub fn rank_label(rank: u32) -> String {
    if rank == 0 {
        "Master".to_string()
    } else {
        format!("Worker {}", rank)
    }
}

/// Phase types in the order they first appear in the stream.
pub fn first_occurrence_phases<'a, I>(records: I) -> Vec<PhaseType>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut phases = Vec::new();
    for record in records {
        if !phases.contains(&record.phase) {
            phases.push(record.phase);
        }
    }
    phases
}

/// Immutable per-rank view of a normalized run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineModel {
    lanes: Vec<RankLane>,
    phases: Vec<PhaseType>,
}

impl TimelineModel {
    /// Group normalized records into lanes, ranks ascending.
    ///
    /// Overlapping or out-of-order intervals within a rank are passed
    /// through as-is.
    pub fn build(normalized: Vec<NormalizedRecord>) -> Self {
        let phases = first_occurrence_phases(&normalized);

        let mut by_rank: BTreeMap<u32, Vec<NormalizedRecord>> = BTreeMap::new();
        for record in normalized {
            by_rank.entry(record.rank).or_default().push(record);
        }

        let lanes = by_rank
            .into_iter()
            .map(|(rank, records)| RankLane {
                rank,
                label: rank_label(rank),
                records,
            })
            .collect();

        Self { lanes, phases }
    }

    /// Lanes in ascending rank order.
    pub fn lanes(&self) -> &[RankLane] {
        &self.lanes
    }

    /// Look up the lane for a rank.
    #[allow(dead_code)] // Query utility
    pub fn lane(&self, rank: u32) -> Option<&RankLane> {
        self.lanes
            .binary_search_by_key(&rank, |lane| lane.rank)
            .ok()
            .map(|idx| &self.lanes[idx])
    }

    /// Distinct ranks, ascending.
    pub fn ranks(&self) -> Vec<u32> {
        self.lanes.iter().map(|lane| lane.rank).collect()
    }

    /// Distinct phase types in first-occurrence order.
    pub fn phase_types(&self) -> &[PhaseType] {
        &self.phases
    }

    /// Total number of intervals.
    pub fn record_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.records.len()).sum()
    }

    #[allow(dead_code)] // Query utility
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Latest normalized end time over all ranks, 0 when empty.
    pub fn max_end(&self) -> f64 {
        self.lanes
            .iter()
            .flat_map(|lane| &lane.records)
            .map(|record| record.end)
            .fold(0.0, f64::max)
    }
}
