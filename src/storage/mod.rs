//! Storage module for persisting reports
//!
//! This module handles all document-store operations, including:
//! - The `ReportStore` contract the scrape pipeline writes through
//! - SQLite database initialization and schema management
//! - Keyed upserts and the read-side listings

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteReportStore;
pub use traits::{ReportStore, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a report database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteReportStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteReportStore> {
    SqliteReportStore::open(path)
}
