//! Analysis modules.
//!
//! Clock normalization, timeline construction, and per-rank statistics.

pub mod aggregator;
pub mod normalize;
pub mod timeline;

pub use aggregator::*;
pub use normalize::{normalize, rank_offsets};
pub use timeline::TimelineModel;
