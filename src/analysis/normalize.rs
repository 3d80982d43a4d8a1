//! Per-rank clock normalization.
//!
//! Every rank timestamps its intervals with its own clock, so raw values
//! from different ranks are not comparable. Each rank is rebased so its
//! earliest start becomes zero. There is no cross-rank synchronization.

use crate::models::{NormalizedRecord, TraceRecord};
use std::collections::BTreeMap;

/// Earliest start time per rank, over all records of that rank.
pub fn rank_offsets(records: &[TraceRecord]) -> BTreeMap<u32, f64> {
    let mut offsets: BTreeMap<u32, f64> = BTreeMap::new();

    for record in records {
        offsets
            .entry(record.rank)
            .and_modify(|offset| *offset = offset.min(record.start))
            .or_insert(record.start);
    }

    offsets
}

/// Rebase every record onto its rank's local zero.
///
/// Output order matches input order. The input is left untouched.
pub fn normalize(records: &[TraceRecord]) -> Vec<NormalizedRecord> {
    let offsets = rank_offsets(records);

    records
        .iter()
        .map(|record| {
            let offset = offsets.get(&record.rank).copied().unwrap_or(0.0);
            NormalizedRecord {
                rank: record.rank,
                phase: record.phase,
                start: record.start - offset,
                end: record.end - offset,
            }
        })
        .collect()
}
