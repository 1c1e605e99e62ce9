//! Mock implementations for testing.

use std::path::PathBuf;
use verso_core::{EditorHost, Notice, NoticeLevel};
use verso_history::LineDiff;

/// An in-memory editor buffer that records everything a session does to it.
///
/// # Example
///
/// ```rust
/// use verso_core::{EditorHost, Notice};
/// use verso_test_utils::MockEditor;
///
/// let mut editor = MockEditor::unsaved("draft");
/// editor.notify(Notice::error("Please save first."));
///
/// assert_eq!(editor.current_file_path(), None);
/// assert_eq!(editor.last_notice().unwrap().message, "Please save first.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEditor {
    content: String,
    path: Option<PathBuf>,
    notices: Vec<Notice>,
    diffs: Vec<Vec<String>>,
    restores: Vec<String>,
}

impl MockEditor {
    /// A buffer that was never saved.
    pub fn unsaved(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// A buffer saved at `path`.
    pub fn saved_at(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Replace the buffer text, as typing would.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Change where the buffer is saved, as "save as" would.
    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Every notice shown so far.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// Notices at warning level.
    pub fn warnings(&self) -> Vec<&Notice> {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .collect()
    }

    /// Rendered diffs, each as its unified-diff lines.
    pub fn diffs(&self) -> &[Vec<String>] {
        &self.diffs
    }

    pub fn last_diff(&self) -> Option<&[String]> {
        self.diffs.last().map(Vec::as_slice)
    }

    /// Content handed over by restores, in order.
    pub fn restores(&self) -> &[String] {
        &self.restores
    }

    /// Forget recorded notices, diffs and restores.
    pub fn clear_records(&mut self) {
        self.notices.clear();
        self.diffs.clear();
        self.restores.clear();
    }
}

impl EditorHost for MockEditor {
    fn current_content(&self) -> String {
        self.content.clone()
    }

    fn current_file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn render_diff(&mut self, diff: &LineDiff) {
        self.diffs.push(diff.to_lines());
    }

    fn restore_content(&mut self, content: &str) {
        self.restores.push(content.to_string());
        self.content = content.to_string();
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
