//! Logs module: buffer scanning, continuation stitching, and analysis.

pub mod stitch;
pub mod analyze;
pub mod scan;

pub use analyze::{DurationAnalyzer, LogAnalyzer, PassthroughAnalyzer};
pub use scan::{DebugScanResult, LogScanner, ScanResult};
