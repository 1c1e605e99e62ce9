//! Shared utilities for verso.
//!
//! - Logging setup with tracing
//! - Per-user directory locations
//! - RAII-based timing for operation measurement

pub mod log;
pub mod path;
pub mod timing;

pub use log::{LogConfig, LogLevel};
pub use timing::TimingGuard;
