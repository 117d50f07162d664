//! State module for tracking scrape task progress
//!
//! # Components
//!
//! - `TaskStage`: Where a scrape task currently is in its pipeline
//! - `StageTracker`: Shareable view of a task's stage
//! - `TaskOutcome`: How a finished task ended

mod task_state;

// Re-export main types
pub use task_state::{StageTracker, TaskFailure, TaskOutcome, TaskStage};
