//! Per-file version history for verso.
//!
//! This crate provides a small versioning engine for single files:
//! - Commit snapshots of a file's content with a message
//! - Amend an existing snapshot in place
//! - Read any snapshot back for restoring
//! - Diff a snapshot against live content, or two snapshots
//!
//! # Example
//!
//! ```no_run
//! use verso_history::{DiffEngine, VersionStore};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = VersionStore::for_current_user()?;
//! let mut log = store.load(Some(Path::new("/work/notes.txt"))).log;
//!
//! let entry = store.commit(&mut log, "draft one\n", "First draft")?;
//!
//! // ... edit the buffer ...
//!
//! let diff = store.diff_with_current(&log, &DiffEngine::new(), &entry.timestamp, "draft two\n")?;
//! for line in diff.iter() {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

mod diff;
mod error;
mod history;
mod store;
mod timestamp;

pub use diff::{
    split_lines, ClassifiedLine, DiffEngine, LineDiff, LineKind, DEFAULT_CONTEXT_LINES,
    DEFAULT_FROM_LABEL, DEFAULT_TO_LABEL,
};
pub use error::{HistoryError, HistoryErrorKind, HistoryResult};
pub use history::{HistoryEntry, HistoryLog};
pub use store::{derive_directory, Loaded, VersionStore, HISTORY_FILE_NAME};
pub use timestamp::{Clock, ManualClock, SystemClock, Timestamp, READABLE_FORMAT, TIMESTAMP_FORMAT};
