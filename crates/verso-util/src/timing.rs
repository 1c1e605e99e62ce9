//! RAII-based timing utilities for measuring and logging operation durations.
//!
//! # Example
//!
//! ```rust
//! use verso_util::timing::TimingGuard;
//!
//! fn commit_snapshot() {
//!     let _timing = TimingGuard::store("commit");
//!     // ... filesystem work ...
//!     // Duration is logged when _timing is dropped
//! }
//! # commit_snapshot();
//! ```

use std::time::Instant;
use tracing::{debug, info, warn, Level};

/// Durations at or above this log at info level.
const INFO_THRESHOLD_MS: u128 = 250;
/// Durations at or above this log at warn level.
const WARN_THRESHOLD_MS: u128 = 2000;

/// RAII guard that measures and logs the duration of an operation.
///
/// When dropped, logs the elapsed time since creation.
pub struct TimingGuard {
    /// Type of operation (e.g., "store", "diff")
    operation_type: &'static str,
    /// Name of the specific operation (e.g., "commit", "load")
    operation_name: String,
    start: Instant,
}

impl TimingGuard {
    /// Create a new timing guard.
    pub fn new(operation_type: &'static str, operation_name: impl Into<String>) -> Self {
        let operation_name = operation_name.into();
        debug!(
            operation_type = operation_type,
            operation_name = %operation_name,
            "Starting operation"
        );
        Self {
            operation_type,
            operation_name,
            start: Instant::now(),
        }
    }

    /// Create a timing guard for a version store operation.
    pub fn store(name: impl Into<String>) -> Self {
        Self::new("store", name)
    }

    /// Create a timing guard for a diff computation.
    pub fn diff(name: impl Into<String>) -> Self {
        Self::new("diff", name)
    }
}

fn level_for(duration_ms: u128) -> Level {
    if duration_ms >= WARN_THRESHOLD_MS {
        Level::WARN
    } else if duration_ms >= INFO_THRESHOLD_MS {
        Level::INFO
    } else {
        Level::DEBUG
    }
}

fn format_duration(duration_ms: u128) -> String {
    if duration_ms < 1000 {
        format!("{duration_ms}ms")
    } else {
        format!("{:.2}s", duration_ms as f64 / 1000.0)
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis();
        let duration_str = format_duration(duration_ms);

        let level = level_for(duration_ms);
        if level == Level::WARN {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Slow operation completed"
            );
        } else if level == Level::INFO {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms = duration_ms as u64,
                duration = %duration_str,
                "Operation completed"
            );
        }
    }
}
