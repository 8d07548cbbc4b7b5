use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{LogLevel, LogLine, QuerySample};

/// Downstream analysis applied once to the full output of a scan.
///
/// Implementations may reorder, enrich or drop records, and return any
/// samples derived from them.
pub trait LogAnalyzer: Send + Sync {
    fn analyze(&self, log_lines: Vec<LogLine>) -> (Vec<LogLine>, Vec<QuerySample>);
}

/// Returns its input unchanged, with no samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughAnalyzer;

impl LogAnalyzer for PassthroughAnalyzer {
    fn analyze(&self, log_lines: Vec<LogLine>) -> (Vec<LogLine>, Vec<QuerySample>) {
        (log_lines, Vec::new())
    }
}

// duration: 12.345 ms  statement: SELECT ...
// duration: 12.345 ms  execute <unnamed>: SELECT ...
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^duration: ([\d.]+) ms\s+(?:statement|execute [^:]*): (.*)$")
        .expect("duration pattern must compile")
});

/// Derives a query sample from every `log_min_duration_statement` record.
///
/// Records are passed through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DurationAnalyzer;

impl DurationAnalyzer {
    fn sample(line: &LogLine) -> Option<QuerySample> {
        if line.log_level != LogLevel::Log {
            return None;
        }
        let caps = DURATION.captures(&line.content)?;
        let runtime_ms = caps[1].parse::<f64>().ok()?;
        let query = caps[2].trim();
        if query.is_empty() {
            return None;
        }

        Some(QuerySample {
            occurred_at: line.occurred_at,
            username: line.username.clone(),
            database: line.database.clone(),
            query: query.to_string(),
            runtime_ms,
            log_line_uuid: line.uuid,
        })
    }
}

impl LogAnalyzer for DurationAnalyzer {
    fn analyze(&self, log_lines: Vec<LogLine>) -> (Vec<LogLine>, Vec<QuerySample>) {
        let samples = log_lines.iter().filter_map(Self::sample).collect();
        (log_lines, samples)
    }
}
