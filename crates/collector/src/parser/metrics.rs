use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::{LogFormat, LogPrefix};

/// Forces the wrapped counters onto their own cache line so concurrent scans
/// of different sources do not contend on unrelated groups.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Per-line outcomes (updated once per raw line)
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub read: AtomicU64,
    pub records: AtomicU64,
    pub continuations: AtomicU64,
    pub orphaned: AtomicU64,
    pub filtered: AtomicU64,
    pub truncated: AtomicU64,
}

/// Records by grammar family
#[derive(Debug, Default)]
pub struct FormatMetrics {
    pub amazon_rds: AtomicU64,
    pub custom: AtomicU64,
    pub simple: AtomicU64,
    pub syslog: AtomicU64,
    pub heroku: AtomicU64,
}

/// Per-scan totals
#[derive(Debug, Default)]
pub struct TotalMetrics {
    pub scans: AtomicU64,
    pub time_nanos: AtomicU64,
    pub bytes: AtomicU64,
}

/// Counters shared by every scanner in the process.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` is not transactional
/// across fields.
#[derive(Debug, Default)]
pub struct ParsingMetrics {
    pub lines: CacheAligned<LineMetrics>,
    pub formats: CacheAligned<FormatMetrics>,
    pub totals: CacheAligned<TotalMetrics>,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self) {
        self.lines.0.read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an emitted record
    #[inline]
    pub fn record_parse(&self, format: LogFormat) {
        self.lines.0.records.fetch_add(1, Ordering::Relaxed);

        let counter = match format {
            LogFormat::Prefix(LogPrefix::AmazonRds) => &self.formats.0.amazon_rds,
            LogFormat::Prefix(LogPrefix::Simple) | LogFormat::Prefix(LogPrefix::Empty) => {
                &self.formats.0.simple
            }
            LogFormat::Prefix(_) => &self.formats.0.custom,
            LogFormat::Syslog => &self.formats.0.syslog,
            LogFormat::HerokuDebug => &self.formats.0.heroku,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_continuation(&self, merged: bool) {
        if merged {
            self.lines.0.continuations.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lines.0.orphaned.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_filtered(&self) {
        self.lines.0.filtered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_truncated(&self) {
        self.lines.0.truncated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan(&self, bytes: u64, time_nanos: u64) {
        self.totals.0.scans.fetch_add(1, Ordering::Relaxed);
        self.totals.0.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.totals.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let scans = self.totals.0.scans.load(Ordering::Relaxed);
        let time_nanos = self.totals.0.time_nanos.load(Ordering::Relaxed);

        MetricsSnapshot {
            lines_read: self.lines.0.read.load(Ordering::Relaxed),
            records: self.lines.0.records.load(Ordering::Relaxed),
            continuations: self.lines.0.continuations.load(Ordering::Relaxed),
            orphaned: self.lines.0.orphaned.load(Ordering::Relaxed),
            filtered: self.lines.0.filtered.load(Ordering::Relaxed),
            truncated: self.lines.0.truncated.load(Ordering::Relaxed),

            amazon_rds_parsed: self.formats.0.amazon_rds.load(Ordering::Relaxed),
            custom_parsed: self.formats.0.custom.load(Ordering::Relaxed),
            simple_parsed: self.formats.0.simple.load(Ordering::Relaxed),
            syslog_parsed: self.formats.0.syslog.load(Ordering::Relaxed),
            heroku_parsed: self.formats.0.heroku.load(Ordering::Relaxed),

            scans,
            bytes_scanned: self.totals.0.bytes.load(Ordering::Relaxed),
            avg_scan_time_us: if scans > 0 {
                (time_nanos as f64 / scans as f64) / 1000.0
            } else {
                0.0
            },
        }
    }
}

/// A read-only snapshot of parsing metrics, for logging or export.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub records: u64,
    pub continuations: u64,
    pub orphaned: u64,
    pub filtered: u64,
    pub truncated: u64,

    pub amazon_rds_parsed: u64,
    pub custom_parsed: u64,
    pub simple_parsed: u64,
    pub syslog_parsed: u64,
    pub heroku_parsed: u64,

    pub scans: u64,
    pub bytes_scanned: u64,
    pub avg_scan_time_us: f64,
}
