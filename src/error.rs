//! Error types for the trace pipeline.
//!
//! Only two things can go wrong while turning trace logs into a timeline:
//! nothing matched the discovery pattern, or a single source could not be
//! parsed. The first halts the run, the second only skips that source.

use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of discovery and ingestion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    /// No trace files matched the pattern in the searched directory.
    #[error("no files matching '{pattern}' found in: {}", .dir.display())]
    EmptyInput { dir: PathBuf, pattern: String },

    /// A whole source was rejected (unreadable, missing column, bad value).
    #[error("error reading {source_name}: {reason}")]
    FileParseFailure { source_name: String, reason: String },
}

impl TraceError {
    /// Build a parse failure for the named source.
    pub fn parse_failure(source_name: impl Into<String>, reason: impl ToString) -> Self {
        TraceError::FileParseFailure {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this error should halt the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TraceError::EmptyInput { .. })
    }
}
