//! Logging system for zenfocus
//!
//! Provides file-based logging with retention. Nothing is written to the
//! terminal so log lines never interleave with the focus countdown.

mod file_writer;
mod retention;

pub use file_writer::{init_file_logging, LogFileInfo};
pub use retention::{cleanup_old_logs, DEFAULT_RETENTION_DAYS};
