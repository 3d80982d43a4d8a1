//! Trace log discovery.
//!
//! Finds the per-rank CSV logs that the parallel run left behind in a
//! results directory.

use crate::error::TraceError;
use anyhow::{Context, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Default file-name pattern written by the instrumented K-Means run.
pub const DEFAULT_PATTERN: &str = "mpi_log_rank_*.csv";

/// Configuration for log discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory to search (not recursive).
    pub directory: PathBuf,
    /// Glob matched against file names only.
    pub pattern: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl From<&crate::config::DiscoverySettings> for DiscoveryConfig {
    fn from(settings: &crate::config::DiscoverySettings) -> Self {
        Self {
            directory: PathBuf::from(&settings.directory),
            pattern: settings.pattern.clone(),
        }
    }
}

/// Locates trace files in a single directory.
pub struct LogDiscovery {
    config: DiscoveryConfig,
    matcher: Pattern,
}

impl LogDiscovery {
    /// Create a new discovery for the given config.
    ///
    /// Fails if the pattern is not a valid glob.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let matcher = Pattern::new(&config.pattern)
            .with_context(|| format!("Invalid file pattern: {}", config.pattern))?;
        Ok(Self { config, matcher })
    }

    /// Directory being searched.
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Pattern being matched.
    pub fn pattern(&self) -> &str {
        &self.config.pattern
    }

    /// List all matching files.
    ///
    /// The returned order is whatever the filesystem yields. An empty result
    /// is reported as [`TraceError::EmptyInput`].
    pub fn discover(&self) -> Result<Vec<PathBuf>, TraceError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.config.directory)
            .min_depth(1)
            .max_depth(1)
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!(
                        "Cannot read entry in {}: {}",
                        self.config.directory.display(),
                        e
                    );
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if self.matches(&name) {
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            return Err(TraceError::EmptyInput {
                dir: self.config.directory.clone(),
                pattern: self.config.pattern.clone(),
            });
        }

        debug!(
            "Discovered {} trace files in {}",
            files.len(),
            self.config.directory.display()
        );
        Ok(files)
    }

    /// Check if a file name matches the pattern.
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.matches(file_name)
    }
}
