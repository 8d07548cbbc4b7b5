use dashmap::DashMap;

use super::LogFormat;

/// Resumption state for one log source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceState {
    /// Offset of the first byte not yet scanned
    pub byte_offset: u64,
    /// Grammar of the most recent record seen in this source
    pub format: Option<LogFormat>,
}

/// Per-source scan cache
///
/// Keeps the running byte offset and the last detected format for each log
/// source, so successive scans of a growing file resume exactly where the
/// previous scan stopped. Entries are independent; callers must not scan the
/// same source concurrently.
#[derive(Debug)]
pub struct SourceCache {
    state: DashMap<String, SourceState>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self {
            state: DashMap::new(),
        }
    }

    /// Offset to start the next scan at (0 for unseen sources)
    pub fn offset(&self, source: &str) -> u64 {
        self.state.get(source).map(|s| s.byte_offset).unwrap_or(0)
    }

    pub fn format(&self, source: &str) -> Option<LogFormat> {
        self.state.get(source).and_then(|s| s.format)
    }

    /// Record the outcome of a completed scan.
    ///
    /// `format` is only replaced when the scan saw a record, so a scan over
    /// continuation lines alone keeps the previous detection.
    pub fn commit(&self, source: &str, next_byte_start: u64, format: Option<LogFormat>) {
        self.state
            .entry(source.to_string())
            .and_modify(|s| {
                s.byte_offset = next_byte_start;
                if format.is_some() {
                    s.format = format;
                }
            })
            .or_insert(SourceState {
                byte_offset: next_byte_start,
                format,
            });
    }

    /// Start a source over from its first byte (e.g. after truncation or rotation)
    pub fn reset(&self, source: &str) {
        if let Some(mut entry) = self.state.get_mut(source) {
            entry.byte_offset = 0;
            entry.format = None;
        }
    }

    /// Forget a source that no longer exists.
    pub fn remove(&self, source: &str) {
        self.state.remove(source);
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();

        for entry in self.state.iter() {
            let state = entry.value();
            stats.total_sources += 1;
            stats.total_bytes_consumed += state.byte_offset;

            match state.format {
                Some(LogFormat::Prefix(_)) => stats.prefix_sources += 1,
                Some(LogFormat::Syslog) => stats.syslog_sources += 1,
                Some(LogFormat::HerokuDebug) => stats.heroku_sources += 1,
                None => stats.undetected_sources += 1,
            }
        }

        stats
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_sources: usize,
    pub total_bytes_consumed: u64,
    pub prefix_sources: usize,
    pub syslog_sources: usize,
    pub heroku_sources: usize,
    pub undetected_sources: usize,
}
