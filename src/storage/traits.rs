//! Storage traits and error types
//!
//! This module defines the trait interface for report stores and
//! associated error types.

use crate::report::StoredReport;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write rejected for {id}: {reason}")]
    Rejected { id: String, reason: String },

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A keyed document collection of reports
///
/// Implementations are shared by every concurrently running scrape task, so
/// all methods take `&self` and must be safe to call from several tasks at
/// once. A failing call affects only that call.
pub trait ReportStore: Send + Sync {
    /// Checks that the store can be reached at all
    fn ping(&self) -> StorageResult<()>;

    // ===== Write side =====

    /// Inserts the report under `id`, or overwrites the document already there
    fn upsert(&self, id: &str, report: &StoredReport) -> StorageResult<()>;

    // ===== Read side =====

    /// Gets a single report by its fingerprint
    fn get(&self, id: &str) -> StorageResult<Option<StoredReport>>;

    /// Counts stored reports
    fn count(&self) -> StorageResult<u64>;

    /// Lists every stored report
    fn list_all(&self) -> StorageResult<Vec<StoredReport>>;

    /// Lists the most recently written reports, newest first
    fn list_recent(&self, limit: usize) -> StorageResult<Vec<StoredReport>>;

    /// Lists reports whose source and display date both match exactly
    fn filter_by_source_and_date(&self, source: &str, date: &str)
        -> StorageResult<Vec<StoredReport>>;
}
