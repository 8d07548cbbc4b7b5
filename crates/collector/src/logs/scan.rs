//! Buffer scanner: walks a slice of a log stream line by line, emitting
//! records with absolute byte offsets so the next scan resumes exactly where
//! this one stopped.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::analyze::LogAnalyzer;
use super::stitch::{stitch, Stitch};
use crate::parser::extract::raw_position;
use crate::parser::formats::heroku;
use crate::parser::metrics::ParsingMetrics;
use crate::parser::{parse_log_line, LogFormat, LogLine, LogPrefix, QuerySample};

/// Output of one incremental scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub log_lines: Vec<LogLine>,
    pub samples: Vec<QuerySample>,
    /// Offset to pass as `initial_byte_start` on the next call
    pub next_byte_start: u64,
    /// Grammar of the last record this scan emitted
    pub last_format: Option<LogFormat>,
}

/// Output of an offline scan.
#[derive(Debug, Clone)]
pub struct DebugScanResult {
    pub log_lines: Vec<LogLine>,
    pub samples: Vec<QuerySample>,
}

/// Scans log buffers into records and hands them to an analyzer.
///
/// The scanner is stateless between calls; offset continuity is carried by
/// the caller through `ScanResult::next_byte_start`.
pub struct LogScanner {
    analyzer: Arc<dyn LogAnalyzer>,
    prefix: Option<LogPrefix>,
    metrics: Option<Arc<ParsingMetrics>>,
}

impl LogScanner {
    pub fn new(analyzer: Arc<dyn LogAnalyzer>) -> Self {
        Self {
            analyzer,
            prefix: None,
            metrics: None,
        }
    }

    /// Parse every line with this grammar instead of auto-detecting.
    pub fn with_prefix(mut self, prefix: Option<LogPrefix>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<ParsingMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn prefix(&self) -> Option<LogPrefix> {
        self.prefix
    }

    /// Scan `buffer`, whose first byte sits at `initial_byte_start` in the
    /// source, dropping records older than `lines_newer_than`.
    ///
    /// Lines are split on raw bytes and decoded one at a time, so offsets
    /// stay exact when the source holds invalid UTF-8. A final line without
    /// a newline ends the scan. Its bytes are counted in `next_byte_start`
    /// even though it yields no record, so callers must only hand over
    /// buffers that end on a line boundary.
    pub fn parse_and_analyze_buffer<B: AsRef<[u8]> + ?Sized>(
        &self,
        buffer: &B,
        initial_byte_start: u64,
        lines_newer_than: DateTime<Utc>,
    ) -> ScanResult {
        let started = Instant::now();
        let mut log_lines: Vec<LogLine> = Vec::new();
        let mut last_format = None;
        let mut next_byte_start = initial_byte_start;

        for raw in buffer.as_ref().split_inclusive(|&b| b == b'\n') {
            let byte_start = next_byte_start;
            next_byte_start += raw.len() as u64;

            if raw.last() != Some(&b'\n') {
                trace!(byte_start, len = raw.len(), "unterminated tail, stopping scan");
                self.with_metrics_do(|m| m.record_truncated());
                break;
            }
            self.with_metrics_do(|m| m.record_line());
            let line = decode(raw, byte_start);

            match parse_log_line(&line, self.prefix) {
                Ok(parsed) => {
                    // Old data is skipped outright; what follows it still
                    // attaches to the last record that was kept.
                    if parsed.occurred_at.with_timezone(&Utc) < lines_newer_than {
                        self.with_metrics_do(|m| m.record_filtered());
                        continue;
                    }
                    last_format = Some(parsed.format);
                    self.with_metrics_do(|m| m.record_parse(parsed.format));

                    log_lines.push(LogLine::from_raw(parsed, byte_start, raw));
                }
                Err(err) => {
                    let byte_len = content_byte_len(raw, &line, err.content());
                    let outcome = stitch(log_lines.last_mut(), err.content(), byte_len);
                    trace!(byte_start, reason = %err, ?outcome, "continuation line");
                    self.record_stitch(outcome);
                }
            }
        }

        let emitted = log_lines.len();
        let (log_lines, samples) = self.analyzer.analyze(log_lines);

        let scanned = next_byte_start - initial_byte_start;
        self.with_metrics_do(|m| m.record_scan(scanned, started.elapsed().as_nanos() as u64));
        debug!(
            initial_byte_start,
            next_byte_start,
            records = emitted,
            samples = samples.len(),
            "scanned log buffer"
        );

        ScanResult {
            log_lines,
            samples,
            next_byte_start,
            last_format,
        }
    }

    /// Offline scan of a complete log dump.
    ///
    /// Recognizes the platform log-drain envelope ahead of the general
    /// grammars, always starts at offset 0 and applies no time cutoff.
    /// Drain records without an envelope timestamp are stamped with the time
    /// the scan started.
    pub fn debug_parse_and_analyze_buffer<B: AsRef<[u8]> + ?Sized>(&self, buffer: &B) -> DebugScanResult {
        let received_at = Utc::now().fixed_offset();
        let mut log_lines: Vec<LogLine> = Vec::new();
        let mut next_byte_start = 0u64;

        for raw in buffer.as_ref().split_inclusive(|&b| b == b'\n') {
            let byte_start = next_byte_start;
            next_byte_start += raw.len() as u64;

            if raw.last() != Some(&b'\n') {
                break;
            }
            let line = decode(raw, byte_start);

            let parsed = match heroku::parse(&line, received_at) {
                Some(result) => result,
                None => parse_log_line(&line, None),
            };
            match parsed {
                Ok(parsed) => {
                    self.with_metrics_do(|m| m.record_parse(parsed.format));
                    log_lines.push(LogLine::from_raw(parsed, byte_start, raw));
                }
                Err(err) => {
                    let byte_len = content_byte_len(raw, &line, err.content());
                    let outcome = stitch(log_lines.last_mut(), err.content(), byte_len);
                    self.record_stitch(outcome);
                }
            }
        }

        let (log_lines, samples) = self.analyzer.analyze(log_lines);
        debug!(records = log_lines.len(), samples = samples.len(), "scanned debug log dump");

        DebugScanResult { log_lines, samples }
    }

    fn record_stitch(&self, outcome: Stitch) {
        match outcome {
            Stitch::Merged => self.with_metrics_do(|m| m.record_continuation(true)),
            Stitch::Orphaned => self.with_metrics_do(|m| m.record_continuation(false)),
            Stitch::Empty => {}
        }
    }

    #[inline]
    fn with_metrics_do(&self, f: impl FnOnce(&ParsingMetrics)) {
        if let Some(metrics) = &self.metrics {
            f(metrics);
        }
    }
}

fn decode(raw: &[u8], byte_start: u64) -> Cow<'_, str> {
    let line = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = line {
        debug!(byte_start, "replaced invalid UTF-8 in log line");
    }
    line
}

/// Source bytes behind `content`, the tail of the decoded `line`.
fn content_byte_len(raw: &[u8], line: &str, content: &str) -> u64 {
    let at = raw_position(raw, line.len().saturating_sub(content.len()));
    (raw.len() - at) as u64
}
