//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// mpi-gantt - Gantt charts for per-rank MPI execution traces
///
/// Reads the `mpi_log_rank_*.csv` files written by each process of a
/// parallel run, rebases every rank onto its own first event, and draws
/// one row per rank with a bar per COMP/COMM interval.
///
/// Examples:
///   mpi-gantt
///   mpi-gantt --dir cmake-build-debug --output gantt.svg
///   mpi-gantt --dir results --report summary.md
///   mpi-gantt --no-chart --report summary.json --format json
///   mpi-gantt --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing the per-rank trace logs
    ///
    /// Defaults to the current directory, or [discovery].directory from the config.
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File-name glob matching the per-rank trace logs
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Output path for the SVG chart
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Chart height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Chart title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Skip rendering the chart
    #[arg(long)]
    pub no_chart: bool,

    /// Also write a per-rank phase summary to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Summary report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mpi-gantt.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .mpi-gantt.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.width == Some(0) || self.height == Some(0) {
            return Err("Chart dimensions must be at least 1 pixel".to_string());
        }

        if let Some(ref pattern) = self.pattern {
            crate::config::check_pattern(pattern)?;
        }

        if let Some(ref dir) = self.dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!("Trace path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            dir: None,
            pattern: None,
            output: None,
            width: None,
            height: None,
            title: None,
            no_chart: false,
            report: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_no_arguments_required() {
        let args = Args::parse_from(["mpi-gantt"]);
        assert!(args.dir.is_none());
        assert!(!args.no_chart);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_format() {
        let args = Args::parse_from(["mpi-gantt", "--report", "s.json", "--format", "json"]);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert_eq!(args.report, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_pattern_with_directory() {
        let mut args = make_args();
        args.pattern = Some("results/mpi_log_rank_*.csv".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_size() {
        let mut args = make_args();
        args.width = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
