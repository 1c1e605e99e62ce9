//! Custom assertion helpers for common test patterns.
//!
//! Provides functions and macros for making test assertions more readable
//! and providing better error messages.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Assert that a file's content equals expected text exactly.
pub fn assert_file_equals(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    if content != expected {
        panic!(
            "File {} content does not match expected.\nDiff:\n{}",
            path.display(),
            line_diff(expected, &content)
        );
    }
}

/// Assert that a file contains specific text.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    assert!(
        content.contains(expected),
        "File {} does not contain expected text.\nExpected to find: {}\nActual content:\n{}",
        path.display(),
        expected,
        content
    );
}

fn line_diff(expected: &str, actual: &str) -> String {
    let diff = similar::TextDiff::from_lines(expected, actual);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            similar::ChangeTag::Delete => "-",
            similar::ChangeTag::Insert => "+",
            similar::ChangeTag::Equal => " ",
        };
        output.push_str(&format!("{}{}", sign, change));
    }

    output
}

/// Every file under a directory with its raw bytes, keyed by relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSnapshot {
    root: PathBuf,
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl DirSnapshot {
    /// Capture `root` recursively. A missing directory captures as empty.
    pub fn capture(root: &Path) -> Self {
        let files = if root.exists() {
            collect(root)
        } else {
            BTreeMap::new()
        };
        Self {
            root: root.to_path_buf(),
            files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative paths of captured files.
    pub fn paths(&self) -> Vec<&Path> {
        self.files.keys().map(PathBuf::as_path).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn collect(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|entry| {
            let path = entry.path();
            let bytes = fs::read(path)
                .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            (relative, bytes)
        })
        .collect()
}

/// Assert that a directory is byte-identical to an earlier snapshot.
pub fn assert_dir_unchanged(before: &DirSnapshot) {
    let after = DirSnapshot::capture(before.root());
    if &after == before {
        return;
    }

    let mut report = String::new();
    for (path, bytes) in &before.files {
        match after.files.get(path) {
            None => report.push_str(&format!("removed: {}\n", path.display())),
            Some(now) if now != bytes => {
                report.push_str(&format!("modified: {}\n", path.display()))
            }
            Some(_) => {}
        }
    }
    for path in after.files.keys() {
        if !before.files.contains_key(path) {
            report.push_str(&format!("added: {}\n", path.display()));
        }
    }
    panic!(
        "Directory {} changed:\n{}",
        before.root().display(),
        report
    );
}

/// Assert that a result is Ok and extract the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err and extract the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}
