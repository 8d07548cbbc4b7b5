//! Follow: poll growing log files and scan whatever complete lines were
//! appended since the previous poll.

use std::io::{ErrorKind, SeekFrom};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::output::write_records;
use crate::error::CollectorError;
use crate::logs::{LogScanner, ScanResult};
use crate::parser::cache::SourceCache;
use crate::parser::metrics::ParsingMetrics;

pub struct Follower {
    scanner: LogScanner,
    cache: Arc<SourceCache>,
    metrics: Arc<ParsingMetrics>,
    max_read_bytes: u64,
}

impl Follower {
    pub fn new(
        scanner: LogScanner,
        cache: Arc<SourceCache>,
        metrics: Arc<ParsingMetrics>,
        max_read_bytes: u64,
    ) -> Self {
        Self {
            scanner,
            cache,
            metrics,
            max_read_bytes,
        }
    }

    /// Scan the complete lines appended to `path` since the last poll.
    ///
    /// Only bytes up to the last newline are handed to the scanner, so a line
    /// still being written is picked up whole on a later poll. Returns `None`
    /// when there is nothing new to scan.
    pub async fn poll(
        &self,
        path: &str,
        lines_newer_than: DateTime<Utc>,
    ) -> Result<Option<ScanResult>, CollectorError> {
        let len = tokio::fs::metadata(path).await?.len();
        let mut offset = self.cache.offset(path);

        if len < offset {
            warn!(path, offset, len, "log file shrank, restarting from the beginning");
            self.cache.reset(path);
            offset = 0;
        }
        if len == offset {
            return Ok(None);
        }

        let want = (len - offset).min(self.max_read_bytes);
        let mut file = File::open(path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        let mut chunk = Vec::with_capacity(want as usize);
        file.take(want).read_to_end(&mut chunk).await?;

        let consumed = match chunk.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos + 1,
            // A single line larger than the read cap would otherwise stall
            // this source forever
            None if chunk.len() as u64 >= self.max_read_bytes => {
                warn!(path, offset, "line exceeds max_read_bytes, skipping its head");
                chunk.len()
            }
            None => return Ok(None),
        };
        chunk.truncate(consumed);

        let result = self.scanner.parse_and_analyze_buffer(&chunk, offset, lines_newer_than);
        if let Some(format) = result.last_format {
            if self.cache.format(path) != Some(format) {
                info!(path, format = format.as_str(), "detected log format");
            }
        }
        self.cache.commit(path, result.next_byte_start, result.last_format);

        Ok(Some(result))
    }

    /// Poll `files` every `poll_interval` until interrupted, writing records
    /// to stdout.
    pub async fn run(
        &self,
        files: &[String],
        poll_interval: Duration,
        lines_newer_than: DateTime<Utc>,
    ) -> Result<(), CollectorError> {
        info!(
            "Following {} log file(s), poll interval {}ms",
            files.len(),
            poll_interval.as_millis()
        );

        let mut interval = time::interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poll_count: u64 = 0;

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping");
                    break;
                }
            }
            poll_count = poll_count.saturating_add(1);

            for path in files {
                match self.poll(path, lines_newer_than).await {
                    Ok(Some(result)) => {
                        let mut out = std::io::stdout().lock();
                        write_records(&mut out, path, &result.log_lines, &result.samples)?;
                    }
                    Ok(None) => {}
                    Err(CollectorError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                        if self.cache.offset(path) > 0 {
                            warn!(path, "log file disappeared, forgetting its offset");
                        }
                        self.cache.remove(path);
                    }
                    Err(e) => error!("Failed to read {}: {}", path, e),
                }
            }

            if poll_count % 60 == 0 {
                let stats = self.cache.stats();
                let snapshot = self.metrics.snapshot();
                debug!(
                    sources = stats.total_sources,
                    bytes = stats.total_bytes_consumed,
                    records = snapshot.records,
                    continuations = snapshot.continuations,
                    "follow poll #{}",
                    poll_count
                );
            }
        }

        Ok(())
    }
}
