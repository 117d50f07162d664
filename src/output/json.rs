//! JSON rendering of stored reports for the read-side commands

use crate::report::StoredReport;
use std::io::Write;

/// Serializes reports as a pretty-printed JSON array
pub fn reports_to_json(reports: &[StoredReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

/// Writes reports as a JSON array followed by a newline
pub fn write_reports<W: Write>(mut writer: W, reports: &[StoredReport]) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writeln!(writer)
}
