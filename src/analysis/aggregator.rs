//! Phase aggregation and statistics.
//!
//! This module turns a timeline into per-rank totals used by the console
//! summary and the written report.

use crate::analysis::timeline::{RankLane, TimelineModel};
use crate::models::{PhaseStats, PhaseType};
use std::collections::BTreeMap;

/// Compute totals for a single lane.
pub fn lane_stats(lane: &RankLane, clock_offset: f64) -> PhaseStats {
    let mut stats = PhaseStats {
        rank: lane.rank,
        label: lane.label.clone(),
        records: lane.records.len(),
        clock_offset,
        ..Default::default()
    };

    for record in &lane.records {
        let duration = record.duration();
        match record.phase {
            PhaseType::Comp => stats.comp_seconds += duration,
            PhaseType::Comm => stats.comm_seconds += duration,
            PhaseType::Unknown => stats.unknown_seconds += duration,
        }
        stats.span_seconds = stats.span_seconds.max(record.end);
    }

    stats
}

/// Compute totals for every lane, ranks ascending.
///
/// `offsets` maps each rank to the raw clock value removed during
/// normalization; ranks missing from it report an offset of 0.
pub fn phase_stats(model: &TimelineModel, offsets: &BTreeMap<u32, f64>) -> Vec<PhaseStats> {
    model
        .lanes()
        .iter()
        .map(|lane| lane_stats(lane, offsets.get(&lane.rank).copied().unwrap_or(0.0)))
        .collect()
}

/// Sum seconds per phase over all ranks.
pub fn totals_by_phase(stats: &[PhaseStats]) -> BTreeMap<PhaseType, f64> {
    let mut totals = BTreeMap::new();

    for s in stats {
        *totals.entry(PhaseType::Comp).or_insert(0.0) += s.comp_seconds;
        *totals.entry(PhaseType::Comm).or_insert(0.0) += s.comm_seconds;
        if s.unknown_seconds > 0.0 {
            *totals.entry(PhaseType::Unknown).or_insert(0.0) += s.unknown_seconds;
        }
    }

    totals
}

/// The rank that finished last (largest span), if any.
pub fn slowest_rank(stats: &[PhaseStats]) -> Option<&PhaseStats> {
    stats.iter().max_by(|a, b| {
        a.span_seconds
            .partial_cmp(&b.span_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::{normalize, rank_offsets};
    use crate::models::TraceRecord;

    const EPS: f64 = 1e-9;

    fn sample_model() -> (TimelineModel, BTreeMap<u32, f64>) {
        let raw = vec![
            TraceRecord::new(0, PhaseType::Comp, 100.0, 105.0),
            TraceRecord::new(0, PhaseType::Comm, 105.0, 108.0),
            TraceRecord::new(1, PhaseType::Comp, 200.0, 204.0),
            TraceRecord::new(1, PhaseType::Unknown, 204.0, 204.5),
        ];
        let offsets = rank_offsets(&raw);
        (TimelineModel::build(normalize(&raw)), offsets)
    }

    #[test]
    fn test_phase_stats() {
        let (model, offsets) = sample_model();
        let stats = phase_stats(&model, &offsets);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].label, "Master");
        assert_eq!(stats[0].records, 2);
        assert!((stats[0].comp_seconds - 5.0).abs() < EPS);
        assert!((stats[0].comm_seconds - 3.0).abs() < EPS);
        assert!((stats[0].span_seconds - 8.0).abs() < EPS);
        assert_eq!(stats[0].clock_offset, 100.0);

        assert_eq!(stats[1].label, "Worker 1");
        assert!((stats[1].unknown_seconds - 0.5).abs() < EPS);
        assert_eq!(stats[1].clock_offset, 200.0);
    }

    #[test]
    fn test_totals_by_phase() {
        let (model, offsets) = sample_model();
        let totals = totals_by_phase(&phase_stats(&model, &offsets));

        assert!((totals[&PhaseType::Comp] - 9.0).abs() < EPS);
        assert!((totals[&PhaseType::Comm] - 3.0).abs() < EPS);
        assert!((totals[&PhaseType::Unknown] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_slowest_rank() {
        let (model, offsets) = sample_model();
        let stats = phase_stats(&model, &offsets);

        assert_eq!(slowest_rank(&stats).map(|s| s.rank), Some(0));
        assert!(slowest_rank(&[]).is_none());
    }
}
