/// Task state definitions for tracking scrape progress
///
/// Every scrape task walks `Pending -> Fetching -> Extracting -> Storing -> Done`.
/// A failure at any stage ends the task immediately, and the outcome remembers
/// which stage it failed in.
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Represents the current stage of a scrape task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStage {
    /// Task is waiting for a concurrency permit or its turn at the source
    Pending,

    /// Listing page is being fetched
    Fetching,

    /// Articles are being extracted from the page
    Extracting,

    /// Extracted reports are being fingerprinted and upserted
    Storing,

    /// Task has finished, successfully or not
    Done,
}

impl TaskStage {
    /// Returns true if no further work happens in this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the task may move from `self` to `next`
    ///
    /// Stages only move forward one step at a time, except that any
    /// non-terminal stage may jump straight to `Done`.
    pub fn can_transition_to(&self, next: TaskStage) -> bool {
        match (self, next) {
            (Self::Done, _) => false,
            (_, Self::Done) => true,
            (Self::Pending, Self::Fetching)
            | (Self::Fetching, Self::Extracting)
            | (Self::Extracting, Self::Storing) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Storing => "storing",
            Self::Done => "done",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Fetching => 1,
            Self::Extracting => 2,
            Self::Storing => 3,
            Self::Done => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Fetching,
            2 => Self::Extracting,
            3 => Self::Storing,
            _ => Self::Done,
        }
    }

    /// Returns all stages in order
    pub fn all_stages() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Extracting,
            Self::Storing,
            Self::Done,
        ]
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stage of a running task, readable from outside the task
///
/// The orchestrator keeps one tracker per task so it can still name the stage
/// of a task that hit the run deadline or panicked.
#[derive(Debug)]
pub struct StageTracker {
    stage: AtomicU8,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            stage: AtomicU8::new(TaskStage::Pending.to_u8()),
        }
    }

    pub fn current(&self) -> TaskStage {
        TaskStage::from_u8(self.stage.load(Ordering::Acquire))
    }

    /// Moves the task to `next`, returning false if the transition is invalid
    pub fn advance(&self, next: TaskStage) -> bool {
        let current = self.current();
        if !current.can_transition_to(next) {
            tracing::debug!("Invalid task transition: {} -> {}", current, next);
            return false;
        }
        self.stage.store(next.to_u8(), Ordering::Release);
        true
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a task ended in failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The listing page could not be fetched
    Fetch(String),

    /// The task did not finish before the run deadline
    Deadline,

    /// The task aborted unexpectedly
    Aborted(String),
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(reason) => write!(f, "fetch failed: {}", reason),
            Self::Deadline => write!(f, "run deadline exceeded"),
            Self::Aborted(reason) => write!(f, "task aborted: {}", reason),
        }
    }
}

/// Final result of one scrape task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The page was fetched and extracted; counts are per article
    Completed {
        /// Reports upserted successfully
        stored: usize,
        /// Reports whose upsert was rejected
        failed: usize,
        /// Article blocks skipped during extraction
        skipped: usize,
    },

    /// The task stopped at `stage`
    Failed { stage: TaskStage, reason: TaskFailure },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// True for a completed task that produced no reports at all
    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            Self::Completed {
                stored: 0,
                failed: 0,
                ..
            }
        )
    }
}
