//! One-shot scans of whole files.

use std::io::Write;

use chrono::{DateTime, Utc};
use tracing::info;

use super::output::write_records;
use crate::error::CollectorError;
use crate::logs::LogScanner;

/// Scan every file once from its first byte.
pub async fn scan_files<W: Write>(
    scanner: &LogScanner,
    files: &[String],
    lines_newer_than: DateTime<Utc>,
    out: &mut W,
) -> Result<(), CollectorError> {
    for path in files {
        let bytes = tokio::fs::read(path).await?;
        let result = scanner.parse_and_analyze_buffer(&bytes, 0, lines_newer_than);
        info!(
            "{}: {} records, {} samples, {} bytes",
            path,
            result.log_lines.len(),
            result.samples.len(),
            result.next_byte_start
        );
        write_records(out, path, &result.log_lines, &result.samples)?;
    }
    Ok(())
}

/// Offline scan of every file, recognizing platform log-drain dumps.
pub async fn debug_scan_files<W: Write>(
    scanner: &LogScanner,
    files: &[String],
    out: &mut W,
) -> Result<(), CollectorError> {
    for path in files {
        let bytes = tokio::fs::read(path).await?;
        let result = scanner.debug_parse_and_analyze_buffer(&bytes);
        info!("{}: {} records, {} samples", path, result.log_lines.len(), result.samples.len());
        write_records(out, path, &result.log_lines, &result.samples)?;
    }
    Ok(())
}
