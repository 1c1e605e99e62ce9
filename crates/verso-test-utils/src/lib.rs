//! Testing utilities, fixtures, and mocks for verso.
//!
//! - **Fixtures**: temporary home directories with tracked files and
//!   pre-seeded version histories
//! - **Mocks**: a recording [`EditorHost`](verso_core::EditorHost)
//! - **Assertions**: file and directory assertions with readable failures
//!
//! # Example Usage
//!
//! ```rust
//! use verso_test_utils::{MockEditor, TestHome};
//! use verso_core::{CommitTarget, EditorSession};
//! use verso_history::DiffEngine;
//!
//! let home = TestHome::new()
//!     .with_file("notes.txt", "hello\n")
//!     .build();
//! let (store, _clock) = home.store();
//!
//! let mut editor = MockEditor::saved_at(home.file("notes.txt"), "hello\n");
//! let mut session = EditorSession::new(store, DiffEngine::new());
//! session.open(&mut editor);
//! session.commit(&mut editor, CommitTarget::New, "first").unwrap();
//!
//! assert_eq!(session.log().len(), 1);
//! assert!(editor.notices().is_empty());
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used items
pub use assertions::{assert_dir_unchanged, assert_file_equals, DirSnapshot};
pub use fixtures::{BuiltTestHome, TestHome};
pub use mocks::MockEditor;
