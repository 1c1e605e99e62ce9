//! Editor session: the version-control workflow of one open buffer.
//!
//! [`EditorSession`] sits between an [`EditorHost`] (a GUI tab, a file on
//! disk, a test double) and the [`VersionStore`]. It owns the buffer's
//! [`HistoryLog`], turns typed errors into [`Notice`]s for the host, and
//! only touches the host's buffer once a snapshot has been read
//! successfully.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use verso_history::{
    DiffEngine, HistoryEntry, HistoryError, HistoryErrorKind, HistoryLog, LineDiff, Timestamp,
    VersionStore,
};

/// Label of the commit option that creates a new version.
pub const NEW_COMMIT_OPTION: &str = "New Commit";

/// Severity of a notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A message for the user, the equivalent of a dialog box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    /// A warning titled "Error".
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// The editor side of a session.
pub trait EditorHost {
    /// Text currently in the buffer.
    fn current_content(&self) -> String;

    /// Path the buffer is saved at, `None` while unsaved.
    fn current_file_path(&self) -> Option<PathBuf>;

    /// Present a computed diff.
    fn render_diff(&mut self, diff: &LineDiff);

    /// Replace the buffer with restored content.
    fn restore_content(&mut self, content: &str);

    /// Show a notice to the user.
    fn notify(&mut self, notice: Notice);
}

/// What a commit writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTarget {
    /// Append a new version.
    New,
    /// Overwrite the version at this history index.
    Amend(usize),
}

/// Version-control state for one buffer.
#[derive(Debug)]
pub struct EditorSession {
    store: VersionStore,
    engine: DiffEngine,
    log: HistoryLog,
}

impl EditorSession {
    /// Create a session with no tracked file yet. Call [`open`](Self::open)
    /// to load the host's history.
    pub fn new(store: VersionStore, engine: DiffEngine) -> Self {
        Self {
            store,
            engine,
            log: HistoryLog::untracked(),
        }
    }

    /// Load history for the host's current file.
    ///
    /// A malformed or unreadable history is reported to the host and the
    /// session continues with an empty log.
    pub fn open(&mut self, host: &mut dyn EditorHost) {
        let path = host.current_file_path();
        self.load_for(host, path.as_deref());
    }

    /// Reload history from disk for the file currently tracked.
    pub fn reload(&mut self, host: &mut dyn EditorHost) {
        let path = self.log.file().map(Path::to_path_buf);
        self.load_for(host, path.as_deref());
    }

    /// Follow the host to a new path, e.g. after "save as".
    ///
    /// Returns true when history was reloaded.
    pub fn retarget(&mut self, host: &mut dyn EditorHost) -> bool {
        let path = host.current_file_path();
        if path.as_deref() == self.log.file() {
            return false;
        }
        info!(
            from = ?self.log.file(),
            to = ?path,
            "Buffer path changed, switching history"
        );
        self.load_for(host, path.as_deref());
        true
    }

    fn load_for(&mut self, host: &mut dyn EditorHost, path: Option<&Path>) {
        let loaded = self.store.load(path);
        self.log = loaded.log;
        if let Some(e) = loaded.degraded {
            host.notify(Notice::error(format!(
                "Failed to load version history:\n{e}"
            )));
        }
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// History listing, oldest first.
    pub fn history_labels(&self) -> Vec<String> {
        self.log.labels()
    }

    /// Choices offered when committing: a new version, then every existing
    /// version as an amend target.
    pub fn commit_options(&self) -> Vec<String> {
        std::iter::once(NEW_COMMIT_OPTION.to_string())
            .chain(self.log.labels())
            .collect()
    }

    /// Map a chosen commit option back to its target.
    pub fn target_for_option(&self, option: &str) -> CoreResult<CommitTarget> {
        if option == NEW_COMMIT_OPTION {
            return Ok(CommitTarget::New);
        }
        self.log
            .iter()
            .position(|e| e.label() == option)
            .map(CommitTarget::Amend)
            .ok_or_else(|| CoreError::UnknownVersion(option.to_string()))
    }

    /// Commit the host's buffer.
    ///
    /// Follows the host to its current path first. An empty message is
    /// refused before anything is written.
    pub fn commit(
        &mut self,
        host: &mut dyn EditorHost,
        target: CommitTarget,
        message: &str,
    ) -> CoreResult<HistoryEntry> {
        self.retarget(host);

        if !self.log.is_tracked() {
            host.notify(Notice::error(
                "Please save the file before committing changes.",
            ));
            return Err(HistoryError::configuration("the buffer has no file path").into());
        }

        if message.trim().is_empty() {
            host.notify(Notice::error("Commit message cannot be empty."));
            return Err(CoreError::EmptyMessage);
        }

        let content = host.current_content();
        match target {
            CommitTarget::New => self
                .store
                .commit(&mut self.log, &content, message)
                .map_err(|e| {
                    host.notify(Notice::error(format!("Failed to save version:\n{e}")));
                    CoreError::from(e)
                }),
            CommitTarget::Amend(index) => {
                if index >= self.log.len() {
                    host.notify(Notice::error("Invalid commit selection."));
                    return Err(CoreError::UnknownVersion(format!("#{index}")));
                }
                match self.store.amend_at(&mut self.log, index, &content, message) {
                    Ok(()) => {
                        let entry = self.log.get(index).cloned().ok_or(CoreError::NoVersions)?;
                        Ok(entry)
                    }
                    Err(e) => {
                        warn!(error = %e, index, "Amend failed, reloading history");
                        host.notify(Notice::error(format!("Failed to commit changes:\n{e}")));
                        self.reload(host);
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Diff the version at `index` against the host's buffer and render it.
    pub fn show_diff(&mut self, host: &mut dyn EditorHost, index: usize) -> CoreResult<LineDiff> {
        self.retarget(host);
        let timestamp = self.diff_target(host, index)?;

        let diff = self
            .store
            .diff_with_current(&self.log, &self.engine, &timestamp, &host.current_content())
            .map_err(|e| notify_read_failure(host, e))?;

        debug!(
            timestamp = %timestamp,
            hunks = diff.hunk_count(),
            "Rendering diff against buffer"
        );
        host.render_diff(&diff);
        Ok(diff)
    }

    /// Diff two stored versions and render the result.
    pub fn compare_versions(
        &mut self,
        host: &mut dyn EditorHost,
        from: usize,
        to: usize,
    ) -> CoreResult<LineDiff> {
        self.retarget(host);
        let from = self.diff_target(host, from)?;
        let to = self.diff_target(host, to)?;

        let diff = self
            .store
            .diff_versions(&self.log, &self.engine, &from, &to)
            .map_err(|e| notify_read_failure(host, e))?;
        host.render_diff(&diff);
        Ok(diff)
    }

    fn diff_target(&self, host: &mut dyn EditorHost, index: usize) -> CoreResult<Timestamp> {
        if !self.log.is_tracked() {
            host.notify(Notice::error("Please save the file to view diffs."));
            return Err(HistoryError::configuration("the buffer has no file path").into());
        }
        if self.log.is_empty() {
            host.notify(Notice::info(
                "Diff Viewer",
                "No versions available for comparison.",
            ));
            return Err(CoreError::NoVersions);
        }
        match self.log.get(index) {
            Some(entry) => Ok(entry.timestamp.clone()),
            None => {
                host.notify(Notice::error("Invalid version selection."));
                Err(CoreError::UnknownVersion(format!("#{index}")))
            }
        }
    }

    /// Replace the host's buffer with the version at `index`.
    pub fn load_version(&mut self, host: &mut dyn EditorHost, index: usize) -> CoreResult<String> {
        let Some(entry) = self.log.get(index) else {
            host.notify(Notice::error("Failed to load the selected version"));
            return Err(CoreError::UnknownVersion(format!("#{index}")));
        };
        let timestamp = entry.timestamp.clone();
        self.restore(host, &timestamp)
    }

    /// Replace the host's buffer with the version a listing label names.
    ///
    /// Labels that match no entry still resolve by their time part, so a
    /// snapshot on disk can be restored even if its message was edited.
    pub fn load_version_by_label(
        &mut self,
        host: &mut dyn EditorHost,
        label: &str,
    ) -> CoreResult<String> {
        let timestamp = match self.log.find_by_label(label) {
            Some(entry) => Some(entry.timestamp.clone()),
            None => label
                .split_once(": ")
                .and_then(|(time, _)| Timestamp::from_readable(time)),
        };
        let Some(timestamp) = timestamp else {
            host.notify(Notice::error("Invalid version format."));
            return Err(CoreError::UnknownVersion(label.to_string()));
        };
        self.restore(host, &timestamp)
    }

    fn restore(&mut self, host: &mut dyn EditorHost, timestamp: &Timestamp) -> CoreResult<String> {
        match self.store.read_snapshot(&self.log, timestamp) {
            Ok(content) => {
                host.restore_content(&content);
                info!(timestamp = %timestamp, "Restored version into buffer");
                Ok(content)
            }
            Err(e) => {
                let message = match e.kind() {
                    HistoryErrorKind::NotFound => {
                        "Failed to load the selected version".to_string()
                    }
                    _ => format!("Failed to load the selected version:\n{e}"),
                };
                host.notify(Notice::error(message));
                Err(e.into())
            }
        }
    }
}

fn notify_read_failure(host: &mut dyn EditorHost, e: HistoryError) -> CoreError {
    let message = match e.kind() {
        HistoryErrorKind::NotFound => {
            "Failed to load the selected version for comparison.".to_string()
        }
        _ => format!("Failed to read the selected version:\n{e}"),
    };
    host.notify(Notice::error(message));
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_constructors() {
        let err = Notice::error("boom");
        assert_eq!(err.level, NoticeLevel::Warning);
        assert_eq!(err.title, "Error");
        assert_eq!(err.to_string(), "Error: boom");

        let info = Notice::info("Diff Viewer", "nothing");
        assert_eq!(info.level, NoticeLevel::Info);
        assert_eq!(info.title, "Diff Viewer");
    }

    #[test]
    fn test_untracked_session_offers_only_new_commit() {
        let session = EditorSession::new(VersionStore::new("/nonexistent"), DiffEngine::new());
        assert!(!session.log().is_tracked());
        assert_eq!(session.commit_options(), vec![NEW_COMMIT_OPTION.to_string()]);
        assert_eq!(
            session.target_for_option(NEW_COMMIT_OPTION).unwrap(),
            CommitTarget::New
        );
        assert!(matches!(
            session.target_for_option("2020-01-01 00:00:00: x"),
            Err(CoreError::UnknownVersion(_))
        ));
    }
}
