//! Run summaries
//!
//! This module folds task outcomes into a [`RunSummary`] and renders it,
//! both as per-source log lines and as a printed report.

use crate::state::{TaskOutcome, TaskStage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters for one source label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceTally {
    /// Tasks run for this source
    pub tasks: usize,

    /// Reports upserted
    pub stored: usize,

    /// Failed tasks plus failed record upserts
    pub failed: usize,

    /// Completed tasks that produced no reports
    pub empty: usize,

    /// Article blocks skipped during extraction
    pub skipped: usize,
}

impl SourceTally {
    fn record(&mut self, outcome: &TaskOutcome) {
        self.tasks += 1;
        match outcome {
            TaskOutcome::Completed {
                stored,
                failed,
                skipped,
            } => {
                self.stored += stored;
                self.failed += failed;
                self.skipped += skipped;
                if outcome.is_empty() {
                    self.empty += 1;
                }
            }
            TaskOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// A task that ended in failure, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTask {
    pub source: String,
    pub url: String,

    /// Stage the task was in when it stopped
    pub stage: TaskStage,
    pub reason: String,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub stored: usize,
    pub failed: usize,
    pub skipped: usize,
    pub tasks: usize,
    pub per_source: BTreeMap<String, SourceTally>,

    /// Failed tasks in join order
    pub failures: Vec<FailedTask>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the outcome of the task that scraped `url` to the totals
    pub fn record(&mut self, source: &str, url: &str, outcome: &TaskOutcome) {
        let tally = self.per_source.entry(source.to_string()).or_default();
        let before = *tally;
        tally.record(outcome);

        self.tasks += 1;
        self.stored += tally.stored - before.stored;
        self.failed += tally.failed - before.failed;
        self.skipped += tally.skipped - before.skipped;

        if let TaskOutcome::Failed { stage, reason } = outcome {
            self.failures.push(FailedTask {
                source: source.to_string(),
                url: url.to_string(),
                stage: *stage,
                reason: reason.to_string(),
            });
        }
    }

    /// Registers a source that ran no tasks, so it still shows up in reports
    pub fn touch(&mut self, source: &str) {
        self.per_source.entry(source.to_string()).or_default();
    }

    pub fn source(&self, source: &str) -> Option<&SourceTally> {
        self.per_source.get(source)
    }

    /// The failure recorded for `url`, if its task failed
    pub fn failure(&self, url: &str) -> Option<&FailedTask> {
        self.failures.iter().find(|f| f.url == url)
    }

    /// Total number of completed tasks that produced nothing
    pub fn empty(&self) -> usize {
        self.per_source.values().map(|t| t.empty).sum()
    }

    /// Emits one info line per source
    pub fn log_per_source(&self) {
        for (source, tally) in &self.per_source {
            tracing::info!(
                "{}: {} tasks, {} stored, {} failed, {} empty, {} skipped",
                source,
                tally.tasks,
                tally.stored,
                tally.failed,
                tally.empty,
                tally.skipped
            );
        }
    }
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Scrape Summary ===\n");

    println!("Overview:");
    println!("  Tasks run: {}", summary.tasks);
    println!("  Reports stored: {}", summary.stored);
    println!("  Failures: {}", summary.failed);
    println!("  Articles skipped: {}", summary.skipped);
    println!();

    if summary.per_source.is_empty() {
        return;
    }

    println!("By Source:");
    for (source, tally) in &summary.per_source {
        println!(
            "  {}: {} tasks, {} stored, {} failed, {} empty",
            source, tally.tasks, tally.stored, tally.failed, tally.empty
        );
    }

    if !summary.failures.is_empty() {
        println!("\nFailed Tasks:");
        for failure in &summary.failures {
            println!(
                "  [{}] {} failed at {}: {}",
                failure.source, failure.url, failure.stage, failure.reason
            );
        }
    }
}
