//! Logging initialization.

use std::path::PathBuf;
use verso_util::{LogConfig, LogLevel};

/// Initialize logging based on verbosity.
/// Verbose runs log to stderr at debug level.
/// Otherwise, logs are appended to a file in the standard log directory.
/// Returns the log file path if logging to file.
pub fn init_logging(verbose: bool, level: LogLevel) -> Option<PathBuf> {
    let config = if verbose {
        LogConfig {
            print: true,
            level: LogLevel::Debug,
            include_location: true,
            file: None,
        }
    } else {
        LogConfig {
            print: false,
            level,
            include_location: false,
            file: Some(verso_util::log::default_log_path()),
        }
    };
    verso_util::log::init(config)
}
