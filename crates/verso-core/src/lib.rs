//! Core coordination layer for verso.
//!
//! This crate sits on top of the history engine:
//! - Configuration management (multi-source, JSONC support)
//! - The editor session workflow: commit, amend, diff and restore for one
//!   buffer, reporting failures as user-facing notices

pub mod config;
pub mod error;
pub mod session;

pub use config::{Config, DiffConfig};
pub use error::{ConfigError, CoreError, CoreResult};
pub use session::{CommitTarget, EditorHost, EditorSession, Notice, NoticeLevel, NEW_COMMIT_OPTION};
