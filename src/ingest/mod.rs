//! Trace log ingestion.
//!
//! Parses per-rank CSV logs into [`TraceRecord`]s. A source is accepted or
//! rejected as a whole: one malformed row discards every record from that
//! source, and ingestion moves on to the next one.

use crate::error::TraceError;
use crate::models::{PhaseType, SkippedSource, TraceRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Columns every trace log must carry.
const REQUIRED_COLUMNS: [&str; 4] = ["Rank", "Type", "Start", "End"];

/// Raw CSV row as written by the instrumented run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TraceRow {
    rank: u32,
    #[serde(rename = "Type")]
    kind: String,
    start: f64,
    end: f64,
}

impl From<TraceRow> for TraceRecord {
    fn from(row: TraceRow) -> Self {
        TraceRecord::new(row.rank, PhaseType::from(row.kind.as_str()), row.start, row.end)
    }
}

/// Something that can be read as a trace log.
#[derive(Debug, Clone)]
pub enum TraceSource {
    /// A log file on disk.
    File(PathBuf),
    /// Log contents already in memory.
    Memory { name: String, content: Vec<u8> },
}

impl TraceSource {
    /// Build an in-memory source.
    #[allow(dead_code)] // For callers that already hold log contents
    pub fn memory(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        TraceSource::Memory {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            TraceSource::File(path) => path.display().to_string(),
            TraceSource::Memory { name, .. } => name.clone(),
        }
    }

    /// Parse the whole source.
    pub fn ingest(&self) -> Result<Vec<TraceRecord>, TraceError> {
        match self {
            TraceSource::File(path) => ingest_file(path),
            TraceSource::Memory { name, content } => ingest_reader(name, content.as_slice()),
        }
    }
}

impl From<PathBuf> for TraceSource {
    fn from(path: PathBuf) -> Self {
        TraceSource::File(path)
    }
}

/// A source that was ingested successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSource {
    pub name: String,
    /// Number of rows it contributed.
    pub rows: usize,
}

/// Outcome of ingesting a batch of sources.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records of every accepted source, concatenated in source order.
    pub records: Vec<TraceRecord>,
    /// Sources that were accepted.
    pub loaded: Vec<LoadedSource>,
    /// One parse failure per rejected source.
    pub failures: Vec<TraceError>,
}

impl IngestReport {
    /// Rejected sources in a serializable form.
    pub fn skipped(&self) -> Vec<SkippedSource> {
        self.failures
            .iter()
            .filter_map(|failure| match failure {
                TraceError::FileParseFailure {
                    source_name,
                    reason,
                } => Some(SkippedSource {
                    name: source_name.clone(),
                    reason: reason.clone(),
                }),
                TraceError::EmptyInput { .. } => None,
            })
            .collect()
    }
}

/// Parse one trace log from any reader.
pub fn ingest_reader<R: Read>(name: &str, reader: R) -> Result<Vec<TraceRecord>, TraceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| TraceError::parse_failure(name, e))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TraceError::parse_failure(
                name,
                format!("missing column '{}'", column),
            ));
        }
    }

    let mut records = Vec::new();
    for result in csv_reader.deserialize::<TraceRow>() {
        let row = result.map_err(|e| TraceError::parse_failure(name, e))?;
        records.push(TraceRecord::from(row));
    }

    debug!("Parsed {} rows from {}", records.len(), name);
    Ok(records)
}

/// Parse one trace log file.
pub fn ingest_file(path: &Path) -> Result<Vec<TraceRecord>, TraceError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| TraceError::parse_failure(&name, e))?;
    ingest_reader(&name, file)
}

/// Ingest every source, skipping the ones that fail.
pub fn ingest_sources<I>(sources: I) -> IngestReport
where
    I: IntoIterator<Item = TraceSource>,
{
    let mut report = IngestReport::default();

    for source in sources {
        match source.ingest() {
            Ok(records) => {
                report.loaded.push(LoadedSource {
                    name: source.name(),
                    rows: records.len(),
                });
                report.records.extend(records);
            }
            Err(e) => {
                warn!("Skipping trace log: {}", e);
                report.failures.push(e);
            }
        }
    }

    report
}
