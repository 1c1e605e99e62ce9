//! Test fixtures for creating reproducible test environments.
//!
//! Provides a temporary home directory holding tracked files and, when
//! needed, version histories that look like an earlier editor session wrote
//! them.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use verso_history::{ManualClock, VersionStore, HISTORY_FILE_NAME};

/// Name of the history root inside a test home.
pub const HISTORY_ROOT: &str = ".version_control_text_editor";

/// Time the fixture clock starts at: 2024-03-01 12:00:00.
pub fn fixed_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid fixture date")
}

/// A seeded version of a tracked file.
#[derive(Debug, Clone)]
struct SeededVersion {
    timestamp: String,
    message: String,
    content: String,
}

/// A temporary home directory with configurable tracked files and history.
///
/// # Example
///
/// ```rust
/// use verso_test_utils::fixtures::TestHome;
///
/// let home = TestHome::new()
///     .with_file("docs/plan.txt", "v2")
///     .with_version("plan.txt", "20240101090000", "first", "v1")
///     .build();
///
/// assert!(home.file("docs/plan.txt").exists());
/// assert!(home.version_dir("plan.txt").join("20240101090000.txt").exists());
/// ```
pub struct TestHome {
    temp_dir: TempDir,
    files: Vec<(PathBuf, String)>,
    versions: Vec<(String, SeededVersion)>,
}

impl TestHome {
    /// Create a new test home builder.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            files: Vec::new(),
            versions: Vec::new(),
        }
    }

    /// Add a file relative to the home root. Parent directories are created
    /// automatically.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.files
            .push((path.as_ref().to_path_buf(), contents.into()));
        self
    }

    /// Seed a committed version for files named `base_name`.
    ///
    /// Versions are written in the order they are added.
    pub fn with_version(
        mut self,
        base_name: &str,
        timestamp: &str,
        message: &str,
        content: &str,
    ) -> Self {
        self.versions.push((
            base_name.to_string(),
            SeededVersion {
                timestamp: timestamp.to_string(),
                message: message.to_string(),
                content: content.to_string(),
            },
        ));
        self
    }

    /// Build the home, creating all files and histories.
    pub fn build(self) -> BuiltTestHome {
        let root = self.temp_dir.path();

        for (path, contents) in &self.files {
            write_with_parents(&root.join(path), contents);
        }

        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.versions {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }

        for name in names {
            let dir = root.join(HISTORY_ROOT).join(name);
            let entries: Vec<serde_json::Value> = self
                .versions
                .iter()
                .filter(|(n, _)| n == name)
                .map(|(_, v)| {
                    write_with_parents(&dir.join(format!("{}.txt", v.timestamp)), &v.content);
                    serde_json::json!({ "timestamp": v.timestamp, "message": v.message })
                })
                .collect();
            let json = serde_json::to_string_pretty(&entries).expect("serializable history");
            write_with_parents(&dir.join(HISTORY_FILE_NAME), &json);
        }

        BuiltTestHome {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

fn write_with_parents(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| {
            panic!(
                "Failed to create parent directory for {}: {}",
                path.display(),
                e
            )
        });
    }
    fs::write(path, contents)
        .unwrap_or_else(|e| panic!("Failed to write file {}: {}", path.display(), e));
}

/// A built test home with files created on disk.
///
/// The temporary directory is removed when this is dropped.
pub struct BuiltTestHome {
    temp_dir: TempDir,
}

impl BuiltTestHome {
    /// Path to the home root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a file relative to the home root.
    pub fn file(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path().join(path.as_ref())
    }

    /// The history root inside this home.
    pub fn history_root(&self) -> PathBuf {
        self.path().join(HISTORY_ROOT)
    }

    /// Version directory for files named `base_name`.
    pub fn version_dir(&self, base_name: &str) -> PathBuf {
        self.history_root().join(base_name)
    }

    /// Read a file relative to the home root.
    pub fn read_file(&self, path: impl AsRef<Path>) -> String {
        let full_path = self.file(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", full_path.display(), e))
    }

    /// Write a file relative to the home root (for modifying during tests).
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<str>) {
        write_with_parents(&self.file(path), contents.as_ref());
    }

    /// A store on this home's history root driven by a manual clock
    /// starting at [`fixed_start`].
    pub fn store(&self) -> (VersionStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(fixed_start()));
        let store = VersionStore::new(self.history_root()).with_clock(clock.clone());
        (store, clock)
    }
}
