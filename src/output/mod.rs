//! Output module for run summaries and read-side listings
//!
//! This module handles:
//! - Folding task outcomes into per-source run summaries
//! - Printing summaries for the command line
//! - Rendering stored reports as JSON

pub mod json;
pub mod summary;

pub use json::{reports_to_json, write_reports};
pub use summary::{print_summary, FailedTask, RunSummary, SourceTally};
