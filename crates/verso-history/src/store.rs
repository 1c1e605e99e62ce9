//! Version store implementation.

use crate::{
    Clock, DiffEngine, HistoryEntry, HistoryError, HistoryLog, HistoryResult, LineDiff,
    SystemClock, Timestamp,
};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use verso_util::TimingGuard;

/// Name of the history log inside a version directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Map a tracked file to its version directory under `root`.
///
/// Only the file's base name is used, so files with the same name in
/// different folders share one directory. Returns `None` for unsaved
/// buffers and for paths without a file name. Never touches the filesystem.
pub fn derive_directory(root: &Path, file: Option<&Path>) -> Option<PathBuf> {
    let name = file?.file_name()?;
    Some(root.join(name))
}

/// Result of loading a tracked file's history.
///
/// Loading never fails outright: an unreadable or malformed `history.json`
/// yields an empty log plus the error in `degraded`, so the file still
/// opens.
#[derive(Debug)]
pub struct Loaded {
    pub log: HistoryLog,
    pub degraded: Option<HistoryError>,
}

/// Storage for per-file snapshots and their history logs.
///
/// Each tracked file gets one directory under the root:
/// ```text
/// root/
///   <basename>/
///     history.json         # [{"timestamp": ..., "message": ...}, ...]
///     <timestamp>.txt      # snapshot content, one file per version
/// ```
///
/// Every operation is a blocking sequence of filesystem calls. There is no
/// locking: two writers on the same directory overwrite each other's
/// `history.json`.
#[derive(Clone)]
pub struct VersionStore {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl VersionStore {
    /// Create a store rooted at `root`. Nothing is created on disk until
    /// the first commit.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a store at `~/.version_control_text_editor`.
    pub fn for_current_user() -> HistoryResult<Self> {
        let root = verso_util::path::history_root()
            .ok_or_else(|| HistoryError::configuration("Could not determine home directory"))?;
        Ok(Self::new(root))
    }

    /// Replace the clock used to stamp new snapshots.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Version directory for `file` under this store's root.
    pub fn derive_directory(&self, file: Option<&Path>) -> Option<PathBuf> {
        derive_directory(&self.root, file)
    }

    /// Load the history of `file`.
    pub fn load(&self, file: Option<&Path>) -> Loaded {
        let _timing = TimingGuard::store("load");
        let directory = self.derive_directory(file);
        let mut log = HistoryLog::new(file.map(Path::to_path_buf), directory.clone());

        let Some(directory) = directory else {
            debug!("No tracked file, starting with empty history");
            return Loaded {
                log,
                degraded: None,
            };
        };

        match read_history(&directory) {
            Ok(entries) => {
                debug!(
                    directory = %directory.display(),
                    entries = entries.len(),
                    "Loaded version history"
                );
                log.entries = entries;
                Loaded {
                    log,
                    degraded: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to load version history");
                Loaded {
                    log,
                    degraded: Some(e),
                }
            }
        }
    }

    /// Snapshot `content` as a new version and append it to `log`.
    ///
    /// Two commits within the same second share a timestamp: the second
    /// overwrites the first snapshot file and both entries point at it.
    pub fn commit(
        &self,
        log: &mut HistoryLog,
        content: &str,
        message: &str,
    ) -> HistoryResult<HistoryEntry> {
        let _timing = TimingGuard::store("commit");
        let directory = tracked_directory(log)?;
        let timestamp = Timestamp::from_datetime(self.clock.now());

        if log.find(&timestamp).is_some() {
            warn!(
                timestamp = %timestamp,
                "Snapshot timestamp already in history, content will be overwritten"
            );
        }

        fs::create_dir_all(&directory).map_err(|e| HistoryError::io(&directory, e))?;

        let snapshot = directory.join(timestamp.snapshot_file_name());
        fs::write(&snapshot, content).map_err(|e| HistoryError::io(&snapshot, e))?;

        let entry = HistoryEntry::new(timestamp, message);
        log.entries.push(entry.clone());

        if let Err(e) = write_history(&directory, log.entries()) {
            // Keep memory in step with disk; the snapshot file stays behind
            // without an entry pointing at it.
            log.entries.pop();
            return Err(e);
        }

        info!(
            timestamp = %entry.timestamp,
            directory = %directory.display(),
            "Committed version"
        );
        Ok(entry)
    }

    /// Overwrite the first version stamped `timestamp`.
    pub fn amend(
        &self,
        log: &mut HistoryLog,
        timestamp: &Timestamp,
        content: &str,
        message: &str,
    ) -> HistoryResult<()> {
        let index = log
            .position(timestamp)
            .ok_or_else(|| HistoryError::not_found(format!("version {timestamp}")))?;
        self.amend_at(log, index, content, message)
    }

    /// Overwrite the version at `index` in history order.
    ///
    /// Replaces the snapshot content and the entry's message, then rewrites
    /// `history.json`. If the history write fails after the snapshot was
    /// replaced, the in-memory message is rolled back but the snapshot is
    /// not; callers should reload history on any error.
    pub fn amend_at(
        &self,
        log: &mut HistoryLog,
        index: usize,
        content: &str,
        message: &str,
    ) -> HistoryResult<()> {
        let _timing = TimingGuard::store("amend");
        let directory = tracked_directory(log)?;
        let timestamp = log
            .get(index)
            .map(|e| e.timestamp.clone())
            .ok_or_else(|| HistoryError::not_found(format!("version #{index}")))?;

        let snapshot = snapshot_path(&directory, &timestamp)?;
        fs::write(&snapshot, content).map_err(|e| HistoryError::io(&snapshot, e))?;

        let previous = std::mem::replace(&mut log.entries[index].message, message.to_string());
        if let Err(e) = write_history(&directory, log.entries()) {
            log.entries[index].message = previous;
            return Err(e);
        }

        info!(timestamp = %timestamp, "Amended version");
        Ok(())
    }

    /// Read the content of the snapshot stamped `timestamp`.
    pub fn read_snapshot(&self, log: &HistoryLog, timestamp: &Timestamp) -> HistoryResult<String> {
        let _timing = TimingGuard::store("read_snapshot");
        let directory = tracked_directory(log)?;
        let snapshot = snapshot_path(&directory, timestamp)?;

        match fs::read_to_string(&snapshot) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(HistoryError::not_found(format!(
                "snapshot {}",
                snapshot.display()
            ))),
            Err(e) => Err(HistoryError::io(&snapshot, e)),
        }
    }

    /// Diff a stored version against live content.
    pub fn diff_with_current(
        &self,
        log: &HistoryLog,
        engine: &DiffEngine,
        timestamp: &Timestamp,
        current: &str,
    ) -> HistoryResult<LineDiff> {
        let old = self.read_snapshot(log, timestamp)?;
        Ok(engine.diff(&old, current))
    }

    /// Diff two stored versions, labelled by their readable timestamps.
    pub fn diff_versions(
        &self,
        log: &HistoryLog,
        engine: &DiffEngine,
        from: &Timestamp,
        to: &Timestamp,
    ) -> HistoryResult<LineDiff> {
        let old = self.read_snapshot(log, from)?;
        let new = self.read_snapshot(log, to)?;
        Ok(engine.diff_labeled(&old, &new, &from.readable(), &to.readable()))
    }

    /// Timestamps in `log` whose snapshot file is missing.
    ///
    /// Such entries are a consistency fault; they are reported, never
    /// repaired.
    pub fn missing_snapshots(&self, log: &HistoryLog) -> Vec<Timestamp> {
        let Some(directory) = log.directory() else {
            return Vec::new();
        };
        log.iter()
            .filter(|e| match snapshot_path(directory, &e.timestamp) {
                Ok(path) => !path.is_file(),
                Err(_) => true,
            })
            .map(|e| e.timestamp.clone())
            .collect()
    }
}

fn tracked_directory(log: &HistoryLog) -> HistoryResult<PathBuf> {
    log.directory()
        .map(Path::to_path_buf)
        .ok_or_else(|| HistoryError::configuration("save the file before using version control"))
}

/// Path of a snapshot file; keys that would leave the directory are
/// treated as unknown versions.
fn snapshot_path(directory: &Path, timestamp: &Timestamp) -> HistoryResult<PathBuf> {
    if !timestamp.is_safe_file_stem() {
        return Err(HistoryError::not_found(format!("version {timestamp}")));
    }
    Ok(directory.join(timestamp.snapshot_file_name()))
}

fn read_history(directory: &Path) -> HistoryResult<Vec<HistoryEntry>> {
    let path = directory.join(HISTORY_FILE_NAME);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(HistoryError::io(&path, e)),
    };
    serde_json::from_str(&content).map_err(|e| HistoryError::malformed(&path, e))
}

/// Rewrite `history.json` in full, via a temp file and rename.
fn write_history(directory: &Path, entries: &[HistoryEntry]) -> HistoryResult<()> {
    let path = directory.join(HISTORY_FILE_NAME);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(|e| HistoryError::io(&path, std::io::Error::other(e)))?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &buf).map_err(|e| HistoryError::io(&temp_path, e))?;
    fs::rename(&temp_path, &path).map_err(|e| HistoryError::io(&path, e))?;

    debug!(path = %path.display(), entries = entries.len(), "Wrote history");
    Ok(())
}
