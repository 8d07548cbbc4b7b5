//! Runtime module: boot, command line, one-shot scans, file following.

pub mod boot;
pub mod cli;
pub mod oneshot;
pub mod follow;
pub mod output;
