//! mpi-gantt - Gantt charts for parallel K-Means execution traces
//!
//! Every MPI rank of the instrumented run writes its own
//! `mpi_log_rank_<n>.csv` with COMP/COMM intervals timed by its own clock.
//! This tool collects those logs, rebases each rank onto its first event,
//! and draws one row per rank.
//!
//! Exit codes:
//!   0 - Success, or no trace logs found (nothing to draw)
//!   1 - Runtime error (bad arguments, config, chart or report write failure)

mod analysis;
mod cli;
mod config;
mod discovery;
mod error;
mod ingest;
mod models;
mod render;
mod report;

use analysis::{normalize, phase_stats, rank_offsets, slowest_rank, TimelineModel};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use discovery::{DiscoveryConfig, LogDiscovery};
use ingest::{IngestReport, TraceSource};
use models::{PhaseStats, ReportMetadata, SummaryReport};
use render::{ChartOptions, RenderPlan};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("mpi-gantt v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\nError: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .mpi-gantt.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", config::CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// A reconciled run: the normalized timeline plus the offsets removed.
struct Reconciled {
    model: TimelineModel,
    offsets: BTreeMap<u32, f64>,
}

/// Normalize ingested records and build the timeline.
fn reconcile(ingested: &IngestReport) -> Reconciled {
    let offsets = rank_offsets(&ingested.records);
    for (rank, offset) in &offsets {
        debug!("Rank {} clock offset: {:.6}s", rank, offset);
    }

    let model = TimelineModel::build(normalize(&ingested.records));
    Reconciled { model, offsets }
}

/// Resolve the configuration and run the pipeline. Returns the exit code.
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate().map_err(anyhow::Error::msg)?;

    run_pipeline(&config)
}

/// Run discovery through rendering with resolved settings.
fn run_pipeline(config: &Config) -> Result<i32> {
    let discovery = LogDiscovery::new(DiscoveryConfig::from(&config.discovery))?;

    // Step 1: find the logs
    let files = match discovery.discover() {
        Ok(files) => files,
        Err(e) if e.is_fatal() => {
            println!(
                "{} files not found in: {}",
                discovery.pattern(),
                discovery.directory().display()
            );
            debug!("{}", e);
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Found {} log files in {}. Generating chart...",
        files.len(),
        discovery.directory().display()
    );

    // Step 2: read them, skipping bad ones
    let ingested = ingest::ingest_sources(files.into_iter().map(TraceSource::from));
    for failure in &ingested.failures {
        eprintln!("Error reading file: {}", failure);
    }

    if ingested.loaded.is_empty() {
        println!("None of the trace logs could be read; nothing to draw.");
        return Ok(0);
    }

    // Step 3: rebase each rank onto its own clock origin
    println!("Normalizing time per rank (fixing clock desync)...");
    let Reconciled { model, offsets } = reconcile(&ingested);
    let stats = phase_stats(&model, &offsets);

    // Step 4: draw
    if config.chart.enabled {
        let plan = RenderPlan::from_model(&model);
        let output = PathBuf::from(&config.chart.output);
        render::render_svg_file(&output, &plan, &ChartOptions::from(&config.chart))?;
        info!(
            "Drew {} bars, {} legend entries",
            plan.bars.len(),
            plan.legend.len()
        );
        println!("Chart saved to: {}", output.display());
    }

    // Step 5: optional summary report
    if let Some(ref report_path) = config.report.output {
        let summary = build_summary(config, &ingested, &model, stats.clone());
        let content = match config.report.format {
            OutputFormat::Json => report::generate_json_report(&summary)?,
            OutputFormat::Markdown => report::generate_markdown_report(&summary),
        };
        report::write_report(&content, Path::new(report_path))?;
        println!("Report saved to: {}", report_path);
    }

    print_summary(&ingested, &model, &stats);

    Ok(0)
}

/// Assemble the serializable summary of a run.
fn build_summary(
    config: &Config,
    ingested: &IngestReport,
    model: &TimelineModel,
    stats: Vec<PhaseStats>,
) -> SummaryReport {
    SummaryReport {
        metadata: ReportMetadata {
            generated_at: Utc::now(),
            directory: config.discovery.directory.clone(),
            pattern: config.discovery.pattern.clone(),
            files_loaded: ingested.loaded.len(),
            files_skipped: ingested.skipped(),
            ranks: model.ranks().len(),
            total_records: model.record_count(),
        },
        phases: model.phase_types().to_vec(),
        ranks: stats,
    }
}

/// Print a short console summary.
fn print_summary(ingested: &IngestReport, model: &TimelineModel, stats: &[PhaseStats]) {
    println!("\nTrace Summary:");
    println!(
        "   Files loaded: {} | skipped: {}",
        ingested.loaded.len(),
        ingested.failures.len()
    );
    println!(
        "   Ranks: {} | intervals: {}",
        model.ranks().len(),
        model.record_count()
    );
    for s in stats {
        println!(
            "   - Rank {} ({}): COMP {:.3}s | COMM {:.3}s | span {:.3}s",
            s.rank, s.label, s.comp_seconds, s.comm_seconds, s.span_seconds
        );
    }
    if let Some(slowest) = slowest_rank(stats) {
        println!(
            "   Longest timeline: rank {} ({:.3}s)",
            slowest.rank, slowest.span_seconds
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use crate::models::PhaseType;
    use std::fs;
    use tempfile::TempDir;

    fn discover_in(dir: &Path) -> std::result::Result<Vec<PathBuf>, TraceError> {
        LogDiscovery::new(DiscoveryConfig {
            directory: dir.to_path_buf(),
            pattern: discovery::DEFAULT_PATTERN.to_string(),
        })
        .unwrap()
        .discover()
    }

    #[test]
    fn test_pipeline_basic_normalization() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mpi_log_rank_0.csv"),
            "Rank,Type,Start,End\n0,COMP,100,105\n0,COMM,105,108\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mpi_log_rank_1.csv"),
            "Rank,Type,Start,End\n1,COMP,200,204\n",
        )
        .unwrap();

        let files = discover_in(dir.path()).unwrap();
        let ingested = ingest::ingest_sources(files.into_iter().map(TraceSource::from));
        let Reconciled { model, offsets } = reconcile(&ingested);

        assert_eq!(model.ranks(), vec![0, 1]);
        let spans: Vec<_> = model
            .lane(0)
            .unwrap()
            .records
            .iter()
            .map(|r| (r.phase, r.start, r.end))
            .collect();
        assert_eq!(
            spans,
            vec![(PhaseType::Comp, 0.0, 5.0), (PhaseType::Comm, 5.0, 8.0)]
        );
        assert_eq!(model.lane(1).unwrap().records[0].end, 4.0);
        assert_eq!(offsets.get(&1), Some(&200.0));
    }

    #[test]
    fn test_pipeline_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = discover_in(dir.path()).unwrap_err();
        assert!(err.is_fatal());
    }

    fn config_for(dir: &Path, out: &Path) -> Config {
        let mut config = Config::default();
        config.discovery.directory = dir.display().to_string();
        config.chart.output = out.join("gantt.svg").display().to_string();
        config
    }

    #[test]
    fn test_run_pipeline_halts_on_empty_directory() {
        let logs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(logs.path().join("empirical_results.csv"), "a,b\n").unwrap();
        let mut config = config_for(logs.path(), out.path());
        config.report.output = Some(out.path().join("summary.md").display().to_string());

        let code = run_pipeline(&config).unwrap();

        assert_eq!(code, 0);
        assert!(!out.path().join("gantt.svg").exists());
        assert!(!out.path().join("summary.md").exists());
    }

    #[test]
    fn test_run_pipeline_writes_chart_and_report() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let out = TempDir::new().unwrap();
        let mut config = config_for(&fixtures, out.path());
        config.report.output = Some(out.path().join("summary.json").display().to_string());
        config.report.format = OutputFormat::Json;

        let code = run_pipeline(&config).unwrap();

        assert_eq!(code, 0);
        let svg = fs::read_to_string(out.path().join("gantt.svg")).unwrap();
        assert!(svg.contains("Worker 2"));
        let json = fs::read_to_string(out.path().join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["ranks"], 3);
    }

    #[test]
    fn test_run_pipeline_all_files_unreadable() {
        let logs = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(logs.path().join("mpi_log_rank_0.csv"), "Rank,Type\n0,COMP\n").unwrap();

        let code = run_pipeline(&config_for(logs.path(), out.path())).unwrap();

        assert_eq!(code, 0);
        assert!(!out.path().join("gantt.svg").exists());
    }

    #[test]
    fn test_pipeline_one_bad_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mpi_log_rank_0.csv"),
            "Rank,Type,Start,End\n0,COMP,1.0,2.0\n0,COMM,2.0,2.5\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mpi_log_rank_1.csv"),
            "Rank,Type,Start,End\n1,COMP,7.0,9.0\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mpi_log_rank_2.csv"),
            "Rank,Type,Start,End\n2,COMP,not-a-number,9.0\n",
        )
        .unwrap();

        let files = discover_in(dir.path()).unwrap();
        let ingested = ingest::ingest_sources(files.into_iter().map(TraceSource::from));
        let Reconciled { model, .. } = reconcile(&ingested);

        assert_eq!(model.record_count(), 3);
        assert_eq!(model.ranks(), vec![0, 1]);
        assert_eq!(ingested.failures.len(), 1);
        assert!(ingested.failures[0].to_string().contains("mpi_log_rank_2.csv"));
    }

    #[test]
    fn test_record_count_matches_loaded_rows() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let files = discover_in(&fixtures).unwrap();
        let ingested = ingest::ingest_sources(files.into_iter().map(TraceSource::from));
        let Reconciled { model, .. } = reconcile(&ingested);

        let rows: usize = ingested.loaded.iter().map(|s| s.rows).sum();
        assert_eq!(model.record_count(), rows);
        assert_eq!(model.ranks(), vec![0, 1, 2]);
        for lane in model.lanes() {
            let min_start = lane
                .records
                .iter()
                .map(|r| r.start)
                .fold(f64::INFINITY, f64::min);
            assert!(min_start.abs() < 1e-9);
        }
    }

    #[test]
    fn test_build_summary() {
        let ingested = ingest::ingest_sources(vec![
            TraceSource::memory("a", "Rank,Type,Start,End\n0,COMP,10,12\n"),
            TraceSource::memory("b", "Rank,Type,Start\n1,COMP,1\n"),
        ]);
        let Reconciled { model, offsets } = reconcile(&ingested);
        let stats = phase_stats(&model, &offsets);

        let summary = build_summary(&Config::default(), &ingested, &model, stats);

        assert_eq!(summary.metadata.files_loaded, 1);
        assert_eq!(summary.metadata.files_skipped.len(), 1);
        assert_eq!(summary.metadata.ranks, 1);
        assert_eq!(summary.metadata.total_records, 1);
        assert_eq!(summary.phases, vec![PhaseType::Comp]);
        assert_eq!(summary.ranks[0].clock_offset, 10.0);
    }
}
