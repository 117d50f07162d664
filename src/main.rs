//! Report Harvester main entry point
//!
//! This is the command-line interface for the Report Harvester news scraper.

use anyhow::Context;
use clap::Parser;
use report_harvester::config::{load_config, Config, SourceConfig};
use report_harvester::output::{print_summary, write_reports};
use report_harvester::storage::{open_storage, ReportStore};
use report_harvester::{default_registry, run_scrape, ExtractorRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Report Harvester: a concurrent news-listing scraper
///
/// Report Harvester fetches the configured listing pages, extracts one
/// report per article, and upserts every report into a local document
/// store keyed by a fingerprint of its title and link.
#[derive(Parser, Debug)]
#[command(name = "report-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent news-listing scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Dotenv-style file with <LABEL>_SITES entries, loaded if present
    #[arg(long, value_name = "FILE", default_value = ".sources")]
    sources_file: PathBuf,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["list_recent", "list_all", "filter_source"])]
    dry_run: bool,

    /// Print the N most recently stored reports as JSON and exit
    #[arg(long, value_name = "N", conflicts_with_all = ["list_all", "filter_source"])]
    list_recent: Option<Option<usize>>,

    /// Print every stored report as JSON and exit
    #[arg(long, conflicts_with = "filter_source")]
    list_all: bool,

    /// Print stored reports of one source as JSON and exit (needs --filter-date)
    #[arg(long, value_name = "SOURCE", requires = "filter_date")]
    filter_source: Option<String>,

    /// Display date to match, e.g. "March 01, 2024"
    #[arg(long, value_name = "DATE", requires = "filter_source")]
    filter_date: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    load_sources_file(&cli.sources_file);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.list_all || cli.list_recent.is_some() || cli.filter_source.is_some() {
        handle_query(&cli, &config)
    } else {
        handle_scrape(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("report_harvester=info,warn"),
            1 => EnvFilter::new("report_harvester=debug,info"),
            2 => EnvFilter::new("report_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads `<LABEL>_SITES` entries into the environment; a missing file is fine
fn load_sources_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => tracing::info!("Loaded source overrides from {}", path.display()),
        Err(e) if e.not_found() => {
            tracing::debug!("No sources file at {}", path.display())
        }
        Err(e) => tracing::warn!("Ignoring sources file {}: {}", path.display(), e),
    }
}

/// Sources after applying environment overrides for every known label
fn effective_sources(
    config: &Config,
    registry: &ExtractorRegistry,
) -> anyhow::Result<SourceConfig> {
    config
        .source_config()
        .with_env_overrides(registry.labels())
        .context("Invalid <LABEL>_SITES override")
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Report Harvester Dry Run ===\n");

    println!("Fetcher Configuration:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Accept-Language: {}", config.fetcher.accept_language);
    println!("  Referer: {}", config.fetcher.referer);
    if config.fetcher.user_agents.is_empty() {
        println!("  User agents: built-in pool");
    } else {
        println!("  User agents: {}", config.fetcher.user_agents.len());
    }

    println!("\nScraper Configuration:");
    println!(
        "  Max concurrent tasks: {}",
        config.scraper.max_concurrent_tasks
    );
    println!(
        "  Politeness delay: {}-{}ms",
        config.scraper.politeness_min_ms, config.scraper.politeness_max_ms
    );
    match config.scraper.run_deadline_secs {
        Some(secs) => println!("  Run deadline: {}s", secs),
        None => println!("  Run deadline: none"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let registry = default_registry();
    let sources = effective_sources(config, &registry)?;
    let unknown: Vec<&str> = sources
        .labels()
        .filter(|label| !registry.contains(label))
        .collect();

    println!("\nSources ({}):", sources.labels().count());
    for label in sources.labels() {
        let urls = sources.urls(label);
        println!("  - {} ({} URLs)", label, urls.len());
        for url in urls {
            println!("    * {}", url);
        }
    }

    if !unknown.is_empty() {
        anyhow::bail!("No extractor registered for: {}", unknown.join(", "));
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start {} scrape tasks", sources.task_count());

    Ok(())
}

/// Handles the read-side flags: prints stored reports as JSON
fn handle_query(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open {}", config.output.database_path))?;

    let reports = if let Some(limit) = cli.list_recent {
        store.list_recent(limit.unwrap_or(config.output.page_size))?
    } else if cli.list_all {
        store.list_all()?
    } else {
        let source = cli.filter_source.as_deref().unwrap_or_default();
        let date = cli.filter_date.as_deref().unwrap_or_default();
        store.filter_by_source_and_date(source, date)?
    };

    tracing::debug!("Query returned {} reports", reports.len());
    write_reports(std::io::stdout().lock(), &reports)?;

    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open {}", config.output.database_path))?;
    tracing::info!("Report store: {}", config.output.database_path);

    let store: Arc<dyn ReportStore> = Arc::new(store);
    match run_scrape(config, store).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            Err(e.into())
        }
    }
}
