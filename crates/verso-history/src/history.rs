//! History entries and the in-memory log of one tracked file.

use crate::Timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Metadata for one snapshot: when it was taken and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: Timestamp,
    pub message: String,
}

impl HistoryEntry {
    pub fn new(timestamp: Timestamp, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    /// Listing label, e.g. `2024-03-09 07:05:03: Fix typo`.
    pub fn label(&self) -> String {
        format!("{}: {}", self.timestamp.readable(), self.message)
    }
}

/// Ordered history of one tracked file.
///
/// Insertion order is chronological order; entries are never re-sorted.
/// The value is owned by a single session and threaded through every
/// [`VersionStore`](crate::VersionStore) call that reads or mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryLog {
    file: Option<PathBuf>,
    directory: Option<PathBuf>,
    pub(crate) entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// An empty log for a buffer with no file behind it.
    pub fn untracked() -> Self {
        Self::default()
    }

    pub(crate) fn new(file: Option<PathBuf>, directory: Option<PathBuf>) -> Self {
        Self {
            file,
            directory,
            entries: Vec::new(),
        }
    }

    /// The tracked file, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The version directory derived from the tracked file.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn is_tracked(&self) -> bool {
        self.directory.is_some()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// First entry with this exact timestamp.
    pub fn find(&self, timestamp: &Timestamp) -> Option<&HistoryEntry> {
        self.position(timestamp).map(|i| &self.entries[i])
    }

    /// Index of the first entry with this exact timestamp.
    pub fn position(&self, timestamp: &Timestamp) -> Option<usize> {
        self.entries.iter().position(|e| &e.timestamp == timestamp)
    }

    /// Listing labels in history order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(HistoryEntry::label).collect()
    }

    /// Resolve a listing label back to the entry it names.
    ///
    /// The label's time part is converted back to a key and its message must
    /// match, so entries that share a second are told apart by message.
    pub fn find_by_label(&self, label: &str) -> Option<&HistoryEntry> {
        let (time, message) = label.split_once(": ")?;
        let timestamp =
            Timestamp::from_readable(time).unwrap_or_else(|| Timestamp::from_string(time));
        self.entries
            .iter()
            .find(|e| e.timestamp == timestamp && e.message == message)
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(entries: &[(&str, &str)]) -> HistoryLog {
        let mut log = HistoryLog::new(
            Some(PathBuf::from("/work/notes.txt")),
            Some(PathBuf::from("/home/u/.version_control_text_editor/notes.txt")),
        );
        log.entries = entries
            .iter()
            .map(|(ts, msg)| HistoryEntry::new(Timestamp::from_string(*ts), *msg))
            .collect();
        log
    }

    #[test]
    fn entry_serializes_as_timestamp_and_message() {
        let entry = HistoryEntry::new(Timestamp::from_string("20240309070503"), "first");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timestamp": "20240309070503", "message": "first"})
        );
    }

    #[test]
    fn entry_ignores_unknown_fields() {
        let entry: HistoryEntry = serde_json::from_str(
            r#"{"timestamp": "20240309070503", "message": "m", "author": "x"}"#,
        )
        .unwrap();
        assert_eq!(entry.message, "m");
    }

    #[test]
    fn label_uses_readable_time() {
        let entry = HistoryEntry::new(Timestamp::from_string("20240309070503"), "Fix typo");
        assert_eq!(entry.label(), "2024-03-09 07:05:03: Fix typo");
    }

    #[test]
    fn untracked_log_has_no_directory() {
        let log = HistoryLog::untracked();
        assert!(!log.is_tracked());
        assert!(log.file().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn find_returns_first_match() {
        let log = log_with(&[
            ("20240309070503", "a"),
            ("20240309070503", "b"),
            ("20240309070600", "c"),
        ]);
        assert_eq!(log.position(&"20240309070503".into()), Some(0));
        assert_eq!(log.find(&"20240309070600".into()).unwrap().message, "c");
        assert!(log.find(&"20240101000000".into()).is_none());
        assert_eq!(log.latest().unwrap().message, "c");
    }

    #[test]
    fn labels_resolve_back_to_entries() {
        let log = log_with(&[
            ("20240309070503", "first: with colon"),
            ("20240309070503", "second"),
        ]);
        let labels = log.labels();
        assert_eq!(labels[0], "2024-03-09 07:05:03: first: with colon");
        assert_eq!(
            log.find_by_label(&labels[1]).unwrap().message,
            "second".to_string()
        );
        assert_eq!(
            log.find_by_label(&labels[0]).unwrap().message,
            "first: with colon"
        );
        assert!(log.find_by_label("garbage").is_none());
    }

    #[test]
    fn iterates_in_insertion_order() {
        let log = log_with(&[("20240309070600", "later"), ("20240309070503", "earlier")]);
        let messages: Vec<_> = (&log).into_iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["later", "earlier"]);
    }
}
