//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ReportStore trait.

use crate::report::StoredReport;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ReportStore, StorageError, StorageResult};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const REPORT_COLUMNS: &str = "id, title, link, date, source, image_url";

/// SQLite report store
///
/// The connection sits behind a mutex so concurrent scrape tasks serialize
/// their writes instead of sharing a connection unsafely.
pub struct SqliteReportStore {
    conn: Mutex<Connection>,
}

impl SqliteReportStore {
    /// Opens or creates a report database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteReportStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn query_reports(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<StoredReport>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let reports = stmt
            .query_map(params, row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reports)
    }
}

fn row_to_report(row: &Row<'_>) -> rusqlite::Result<StoredReport> {
    Ok(StoredReport {
        id: row.get(0)?,
        title: row.get(1)?,
        link: row.get(2)?,
        date: row.get(3)?,
        source: row.get(4)?,
        image_url: row.get(5)?,
    })
}

impl ReportStore for SqliteReportStore {
    fn ping(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn upsert(&self, id: &str, report: &StoredReport) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO reports (id, title, link, date, source, image_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                link = excluded.link,
                date = excluded.date,
                source = excluded.source,
                image_url = excluded.image_url,
                updated_at = excluded.updated_at",
            params![
                id,
                report.title,
                report.link,
                report.date,
                report.source,
                report.image_url,
                now
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<StoredReport>> {
        let conn = self.lock()?;
        let report = conn
            .query_row(
                &format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS),
                params![id],
                row_to_report,
            )
            .optional()?;
        Ok(report)
    }

    fn count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn list_all(&self) -> StorageResult<Vec<StoredReport>> {
        self.query_reports(
            &format!("SELECT {} FROM reports ORDER BY id", REPORT_COLUMNS),
            params![],
        )
    }

    fn list_recent(&self, limit: usize) -> StorageResult<Vec<StoredReport>> {
        self.query_reports(
            &format!(
                "SELECT {} FROM reports ORDER BY updated_at DESC, rowid DESC LIMIT ?1",
                REPORT_COLUMNS
            ),
            params![limit as i64],
        )
    }

    fn filter_by_source_and_date(
        &self,
        source: &str,
        date: &str,
    ) -> StorageResult<Vec<StoredReport>> {
        self.query_reports(
            &format!(
                "SELECT {} FROM reports WHERE source = ?1 AND date = ?2 ORDER BY id",
                REPORT_COLUMNS
            ),
            params![source, date],
        )
    }
}
