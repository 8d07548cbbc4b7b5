// Domain-driven module structure for the log collector.

// Core parsing engine
pub mod parser;
pub mod logs;

// Runtime surface
pub mod conf;
pub mod error;
pub mod runtime;
