//! Phase summary report generation.
//!
//! This module renders the per-rank phase totals of a run as Markdown or
//! JSON.

use crate::analysis::totals_by_phase;
use crate::models::{PhaseStats, ReportMetadata, SummaryReport};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SummaryReport) -> String {
    let mut output = String::new();

    output.push_str("# MPI Trace Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_ranks_section(&report.ranks));
    output.push_str(&generate_totals_section(&report.ranks));

    if !report.metadata.files_skipped.is_empty() {
        output.push_str(&generate_skipped_section(&report.metadata));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Directory:** `{}`\n", metadata.directory));
    section.push_str(&format!("- **Pattern:** `{}`\n", metadata.pattern));
    section.push_str(&format!("- **Files Loaded:** {}\n", metadata.files_loaded));
    if !metadata.files_skipped.is_empty() {
        section.push_str(&format!(
            "- **Files Skipped:** {}\n",
            metadata.files_skipped.len()
        ));
    }
    section.push_str(&format!("- **Ranks:** {}\n", metadata.ranks));
    section.push_str(&format!("- **Intervals:** {}\n", metadata.total_records));
    section.push('\n');

    section
}

/// Generate the per-rank table.
fn generate_ranks_section(ranks: &[PhaseStats]) -> String {
    let mut section = String::new();

    section.push_str("## Ranks\n\n");

    if ranks.is_empty() {
        section.push_str("No intervals were recorded.\n\n");
        return section;
    }

    section.push_str("| Rank | Role | Intervals | COMP (s) | COMM (s) | Other (s) | Span (s) | COMM % |\n");
    section.push_str("|:---:|:---|:---:|---:|---:|---:|---:|---:|\n");

    for stats in ranks {
        section.push_str(&format!(
            "| {} | {} | {} | {:.6} | {:.6} | {:.6} | {:.6} | {:.1} |\n",
            stats.rank,
            stats.label,
            stats.records,
            stats.comp_seconds,
            stats.comm_seconds,
            stats.unknown_seconds,
            stats.span_seconds,
            stats.comm_ratio(),
        ));
    }
    section.push('\n');

    section
}

/// Generate totals across all ranks.
fn generate_totals_section(ranks: &[PhaseStats]) -> String {
    let totals = totals_by_phase(ranks);
    if totals.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Totals\n\n");
    section.push_str("| Phase | Seconds |\n");
    section.push_str("|:---|---:|\n");
    for (phase, seconds) in totals {
        section.push_str(&format!("| {} | {:.6} |\n", phase, seconds));
    }
    section.push('\n');

    section
}

/// Generate the list of skipped sources.
fn generate_skipped_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Skipped Files\n\n");
    for skipped in &metadata.files_skipped {
        section.push_str(&format!("- `{}`: {}\n", skipped.name, skipped.reason));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SummaryReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write already generated report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhaseType, SkippedSource};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_report() -> SummaryReport {
        SummaryReport {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                directory: "results".to_string(),
                pattern: "mpi_log_rank_*.csv".to_string(),
                files_loaded: 2,
                files_skipped: vec![SkippedSource {
                    name: "mpi_log_rank_2.csv".to_string(),
                    reason: "invalid float literal".to_string(),
                }],
                ranks: 2,
                total_records: 3,
            },
            phases: vec![PhaseType::Comp, PhaseType::Comm],
            ranks: vec![
                PhaseStats {
                    rank: 0,
                    label: "Master".to_string(),
                    records: 2,
                    comp_seconds: 5.0,
                    comm_seconds: 3.0,
                    unknown_seconds: 0.0,
                    span_seconds: 8.0,
                    clock_offset: 100.0,
                },
                PhaseStats {
                    rank: 1,
                    label: "Worker 1".to_string(),
                    records: 1,
                    comp_seconds: 4.0,
                    comm_seconds: 0.0,
                    unknown_seconds: 0.0,
                    span_seconds: 4.0,
                    clock_offset: 200.0,
                },
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# MPI Trace Summary"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("- **Ranks:** 2\n"));
        assert!(markdown.contains("| 0 | Master | 2 |"));
        assert!(markdown.contains("Worker 1"));
        assert!(markdown.contains("| COMP | 9.000000 |"));
        assert!(markdown.contains("## Skipped Files"));
        assert!(markdown.contains("mpi_log_rank_2.csv"));
    }

    #[test]
    fn test_markdown_without_ranks() {
        let mut report = create_test_report();
        report.ranks.clear();
        report.metadata.files_skipped.clear();

        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("No intervals were recorded."));
        assert!(!markdown.contains("## Totals"));
        assert!(!markdown.contains("## Skipped Files"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"ranks\""));
        assert!(json.contains("\"comp_seconds\""));
        assert!(json.contains("\"COMP\""));
        assert!(json.contains("\"files_skipped\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["ranks"], 2);
    }

    #[test]
    fn test_write_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("summary.md");

        write_report("# hello\n", &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
    }
}
