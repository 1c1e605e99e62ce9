//! Command handlers for the verso CLI.

pub mod config;
pub mod history;
pub mod logging;

pub use config::*;
pub use history::*;
pub use logging::*;
