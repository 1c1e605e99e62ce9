//! A file on disk acting as the editor buffer.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use verso_core::{EditorHost, Notice, NoticeLevel};
use verso_history::LineDiff;

/// Editor host backed by a file.
///
/// The buffer starts as the file's content. Restores only change the
/// buffer; [`FileHost::save`] writes it back.
pub struct FileHost {
    path: PathBuf,
    content: String,
    modified: bool,
}

impl FileHost {
    /// Read `path` into the buffer. A missing file starts empty.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let content = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        } else {
            String::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            content,
            modified: false,
        })
    }

    /// Open a file that must already exist.
    pub fn open_existing(path: &Path) -> anyhow::Result<Self> {
        anyhow::ensure!(path.is_file(), "{} does not exist", path.display());
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the buffer back if a restore changed it.
    pub fn save(&mut self) -> anyhow::Result<bool> {
        if !self.modified {
            return Ok(false);
        }
        fs::write(&self.path, &self.content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.modified = false;
        Ok(true)
    }
}

impl EditorHost for FileHost {
    fn current_content(&self) -> String {
        self.content.clone()
    }

    fn current_file_path(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }

    fn render_diff(&mut self, diff: &LineDiff) {
        print!("{diff}");
    }

    fn restore_content(&mut self, content: &str) {
        self.content = content.to_string();
        self.modified = true;
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Warning => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let host = FileHost::open(&dir.path().join("new.txt")).unwrap();
        assert_eq!(host.current_content(), "");
        assert!(FileHost::open_existing(&dir.path().join("new.txt")).is_err());
    }

    #[test]
    fn test_save_only_after_restore() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "before").unwrap();

        let mut host = FileHost::open_existing(&path).unwrap();
        assert!(!host.save().unwrap());

        host.restore_content("after");
        assert!(host.save().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "after");
        assert_eq!(host.current_file_path(), Some(path));
    }
}
