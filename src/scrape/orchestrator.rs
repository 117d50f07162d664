//! Scrape orchestration
//!
//! This module drives a complete run:
//! - Fatal pre-checks (store reachable, every source has an extractor)
//! - Expanding sources into one task per URL
//! - Spawning every task, pacing same-source requests through a shared gate
//! - Joining all tasks and folding their outcomes into a `RunSummary`
//!
//! Each task walks `Pending -> Fetching -> Extracting -> Storing -> Done` and
//! turns every failure, including a panic, into a [`TaskOutcome`].

use crate::config::{Config, ScraperConfig, SourceConfig};
use crate::extract::{default_registry, Extractor, ExtractorRegistry};
use crate::output::RunSummary;
use crate::report::{RawReport, StoredReport};
use crate::scrape::fetcher::Fetcher;
use crate::scrape::pacing::{Politeness, SourceGates};
use crate::state::{StageTracker, TaskFailure, TaskOutcome, TaskStage};
use crate::storage::ReportStore;
use crate::{ConfigError, HarvestError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Runs scrape tasks against a shared fetcher, extractor registry and store
pub struct Orchestrator {
    fetcher: Arc<Fetcher>,
    extractors: Arc<ExtractorRegistry>,
    store: Arc<dyn ReportStore>,
    politeness: Politeness,
    max_concurrent_tasks: usize,
    run_deadline: Option<Duration>,
}

impl Orchestrator {
    /// Creates an orchestrator from its collaborators
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared HTTP fetcher
    /// * `extractors` - Registry used to look up each source's extractor
    /// * `store` - Document store every task writes to
    /// * `settings` - Concurrency, politeness and deadline settings
    pub fn new(
        fetcher: Fetcher,
        extractors: ExtractorRegistry,
        store: Arc<dyn ReportStore>,
        settings: &ScraperConfig,
    ) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractors: Arc::new(extractors),
            store,
            politeness: Politeness::from_config(settings),
            max_concurrent_tasks: settings.max_concurrent_tasks.max(1) as usize,
            run_deadline: settings.run_deadline_secs.map(Duration::from_secs),
        }
    }

    /// Creates an orchestrator with the default extractors
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn from_config(config: &Config, store: Arc<dyn ReportStore>) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::from_config(&config.fetcher)?;
        Ok(Self::new(fetcher, default_registry(), store, &config.scraper))
    }

    /// Replaces the politeness bounds
    pub fn with_politeness(mut self, politeness: Politeness) -> Self {
        self.politeness = politeness;
        self
    }

    /// Sets or clears the overall run deadline
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.run_deadline = deadline;
        self
    }

    pub fn extractors(&self) -> &ExtractorRegistry {
        &self.extractors
    }

    /// Runs one scrape over every configured source
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - All tasks were joined; failures are inside the summary
    /// * `Err(HarvestError)` - The store is unreachable or a source is unknown
    pub async fn run(&self, sources: &SourceConfig) -> Result<RunSummary, HarvestError> {
        self.store.ping().map_err(|e| {
            tracing::error!("Report store unreachable: {}", e);
            e
        })?;

        let mut summary = RunSummary::new();
        for label in sources.labels() {
            if !self.extractors.contains(label) {
                tracing::error!("No extractor registered for source {}", label);
                return Err(ConfigError::UnknownSource(label.to_string()).into());
            }
            if sources.urls(label).is_empty() {
                tracing::warn!("No URLs configured for source {}", label);
            }
            summary.touch(label);
        }

        let tasks = sources.expand();
        tracing::info!(
            "Starting scrape: {} tasks across {} sources",
            tasks.len(),
            summary.per_source.len()
        );

        let started = std::time::Instant::now();
        let deadline = self.run_deadline.map(|d| Instant::now() + d);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_tasks));
        let gates = Arc::new(SourceGates::new(self.politeness, sources.labels()));

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(extractor) = self.extractors.get(&task.source) else {
                continue;
            };

            let tracker = Arc::new(StageTracker::new());
            let worker = TaskWorker {
                fetcher: Arc::clone(&self.fetcher),
                extractor,
                store: Arc::clone(&self.store),
                semaphore: Arc::clone(&semaphore),
                gates: Arc::clone(&gates),
                tracker: Arc::clone(&tracker),
            };
            let source = task.source.clone();
            let url = task.url.clone();

            let handle = tokio::spawn(async move {
                let work = worker.run(&source, &url);
                match deadline {
                    Some(at) => match tokio::time::timeout_at(at, work).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            tracing::warn!("Run deadline reached before {} finished", url);
                            worker.fail(TaskFailure::Deadline)
                        }
                    },
                    None => work.await,
                }
            });
            handles.push((task, tracker, handle));
        }

        for (task, tracker, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Task for {} aborted: {}", task.url, e);
                    TaskOutcome::Failed {
                        stage: tracker.current(),
                        reason: TaskFailure::Aborted(e.to_string()),
                    }
                }
            };
            if let TaskOutcome::Failed { stage, reason } = &outcome {
                tracing::warn!("{} failed at {}: {}", task.url, stage, reason);
            }
            summary.record(&task.source, &task.url, &outcome);
        }

        summary.log_per_source();
        tracing::info!(
            "Scrape completed in {:?}: {} stored, {} failed, {} skipped",
            started.elapsed(),
            summary.stored,
            summary.failed,
            summary.skipped
        );

        Ok(summary)
    }
}

/// Everything one spawned task needs, owned by that task
struct TaskWorker {
    fetcher: Arc<Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: Arc<dyn ReportStore>,
    semaphore: Arc<Semaphore>,
    gates: Arc<SourceGates>,
    tracker: Arc<StageTracker>,
}

impl TaskWorker {
    async fn run(&self, source: &str, url: &str) -> TaskOutcome {
        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => return self.fail(TaskFailure::Aborted(e.to_string())),
        };

        let waited = self.gates.wait_turn(source).await;
        if !waited.is_zero() {
            tracing::debug!("Waited {:?} before requesting {}", waited, url);
        }

        tracing::info!("Scraping {} ({})", url, self.extractor.label());
        self.tracker.advance(TaskStage::Fetching);
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("{}", e);
                return self.fail(TaskFailure::Fetch(e.to_string()));
            }
        };
        drop(permit);

        self.tracker.advance(TaskStage::Extracting);
        let extraction = self.extractor.extract(&page);
        if extraction.is_empty() {
            tracing::warn!("No articles found on {}", url);
        }

        self.tracker.advance(TaskStage::Storing);
        let (stored, failed) = self.store_all(extraction.reports);

        self.tracker.advance(TaskStage::Done);
        tracing::info!(
            "Finished {}: {} stored, {} failed, {} skipped",
            url,
            stored,
            failed,
            extraction.skipped
        );

        TaskOutcome::Completed {
            stored,
            failed,
            skipped: extraction.skipped,
        }
    }

    /// Upserts each report on its own; one rejected write never stops the rest
    fn store_all(&self, reports: Vec<RawReport>) -> (usize, usize) {
        let mut stored = 0;
        let mut failed = 0;

        for raw in reports {
            let report = StoredReport::from(raw);
            match self.store.upsert(&report.id, &report) {
                Ok(()) => {
                    tracing::debug!("Stored {} ({})", report.id, report.link);
                    stored += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to store {}: {}", report.link, e);
                    failed += 1;
                }
            }
        }

        (stored, failed)
    }

    fn fail(&self, reason: TaskFailure) -> TaskOutcome {
        let stage = self.tracker.current();
        self.tracker.advance(TaskStage::Done);
        TaskOutcome::Failed { stage, reason }
    }
}

/// Runs a complete scrape from configuration
///
/// Sources come from the `[sources]` table, with `<LABEL>_SITES`
/// environment variables taking precedence for every known label.
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `store` - The report store to write to
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished; per-task failures are counted inside
/// * `Err(HarvestError)` - A fatal pre-check failed
pub async fn run_scrape(
    config: &Config,
    store: Arc<dyn ReportStore>,
) -> Result<RunSummary, HarvestError> {
    let orchestrator = Orchestrator::from_config(config, store)?;
    let sources = config
        .source_config()
        .with_env_overrides(orchestrator.extractors().labels())?;

    orchestrator.run(&sources).await
}
