//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mpi-gantt.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".mpi-gantt.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where to look for trace logs.
    #[serde(default)]
    pub discovery: DiscoverySettings,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartSettings,

    /// Summary report settings.
    #[serde(default)]
    pub report: ReportSettings,
}

/// Trace log discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Directory holding the per-rank logs.
    #[serde(default = "default_directory")]
    pub directory: String,

    /// File-name glob for the per-rank logs.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            pattern: default_pattern(),
        }
    }
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_pattern() -> String {
    crate::discovery::DEFAULT_PATTERN.to_string()
}

/// Gantt chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSettings {
    /// Render the chart at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output SVG path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Chart title.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            output: default_output(),
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output() -> String {
    "mpi_gantt.svg".to_string()
}

fn default_width() -> u32 {
    1500
}

fn default_height() -> u32 {
    800
}

fn default_title() -> String {
    "MPI Execution Gantt Chart (Normalized)".to_string()
}

/// Summary report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Report path. No report is written when unset.
    #[serde(default)]
    pub output: Option<String>,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.dir {
            self.discovery.directory = dir.display().to_string();
        }
        if let Some(ref pattern) = args.pattern {
            self.discovery.pattern = pattern.clone();
        }

        if let Some(ref output) = args.output {
            self.chart.output = output.display().to_string();
        }
        if let Some(width) = args.width {
            self.chart.width = width;
        }
        if let Some(height) = args.height {
            self.chart.height = height;
        }
        if let Some(ref title) = args.title {
            self.chart.title = title.clone();
        }
        if args.no_chart {
            self.chart.enabled = false;
        }

        if let Some(ref report) = args.report {
            self.report.output = Some(report.display().to_string());
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Check the merged settings.
    ///
    /// Applies the same rules as `Args::validate`, so values coming from the
    /// config file are held to the CLI's standard.
    pub fn validate(&self) -> Result<(), String> {
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err("Chart dimensions must be at least 1 pixel".to_string());
        }
        check_pattern(&self.discovery.pattern)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Reject patterns that cannot match a bare file name.
pub fn check_pattern(pattern: &str) -> Result<(), String> {
    if pattern.trim().is_empty() {
        return Err("File pattern must not be empty".to_string());
    }
    if pattern.contains('/') || pattern.contains('\\') {
        return Err(format!(
            "File pattern '{}' matches file names only; set the directory separately",
            pattern
        ));
    }
    Ok(())
}
