/// Log line parsing for database server logs
///
/// Turns raw text lines into structured records, recognizing the supported
/// `log_line_prefix` templates and the syslog wrapper.
///
/// # Architecture
///
/// - `prefix.rs`: The grammar set, one compiled pattern and field map per template
/// - `detector.rs`: Grammar selection, fixed priority order
/// - `extract.rs`: Capture groups to raw field text
/// - `time.rs`: Timestamp normalization
/// - `parse.rs`: The single-line parse operation tying the above together
/// - `formats/`: Wrapper grammars (syslog, platform log drain)
/// - `cache.rs`: Per-source offset and format cache
/// - `metrics.rs`: Scan counters

pub mod prefix;
pub mod detector;
pub mod extract;
pub mod time;
pub mod parse;
pub mod formats;
pub mod model;
pub mod cache;
pub mod metrics;

// Re-export commonly used types
pub use model::{LogFormat, LogLevel, LogLine, ParseError, ParsedLine, QuerySample};
pub use prefix::{is_supported_prefix, LogPrefix};
pub use parse::parse_log_line;
