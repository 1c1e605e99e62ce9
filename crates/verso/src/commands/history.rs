//! Version history commands: log, commit, show, diff, restore, dir.

use crate::host::FileHost;
use anyhow::{bail, Context};
use std::path::Path;
use verso_core::{CommitTarget, Config, CoreError, EditorSession};
use verso_history::{HistoryLog, Timestamp};

/// Marks an error the host already showed to the user.
#[derive(Debug, thiserror::Error)]
#[error("command failed")]
pub struct Reported;

fn reported(e: CoreError) -> anyhow::Error {
    anyhow::Error::new(e).context(Reported)
}

fn open_session(config: &Config, host: &mut FileHost) -> anyhow::Result<EditorSession> {
    let store = config.version_store()?;
    let mut session = EditorSession::new(store, config.diff_engine());
    session.open(host);
    Ok(session)
}

/// Resolve a version selector to a history index.
///
/// Accepts, in order: `latest`, a timestamp key, a readable timestamp, a
/// 1-based number as printed by `log`, or a full listing label.
pub fn resolve_version(log: &HistoryLog, selector: &str) -> anyhow::Result<usize> {
    let selector = selector.trim();

    if selector.eq_ignore_ascii_case("latest") {
        if let Some(index) = log.len().checked_sub(1) {
            return Ok(index);
        }
        bail!("No versions recorded yet");
    }
    if let Some(index) = log.position(&Timestamp::from_string(selector)) {
        return Ok(index);
    }
    if let Some(index) = Timestamp::from_readable(selector).and_then(|t| log.position(&t)) {
        return Ok(index);
    }
    if let Ok(number) = selector.parse::<usize>() {
        if (1..=log.len()).contains(&number) {
            return Ok(number - 1);
        }
    }
    if let Some(entry) = log.find_by_label(selector) {
        if let Some(index) = log.iter().position(|e| e == entry) {
            return Ok(index);
        }
    }
    bail!("No version matches '{selector}'")
}

/// List a file's versions.
pub fn show_log(config: &Config, file: &Path, json: bool) -> anyhow::Result<()> {
    let mut host = FileHost::open(file)?;
    let session = open_session(config, &mut host)?;
    let log = session.log();

    if json {
        println!("{}", serde_json::to_string_pretty(log.entries())?);
        return Ok(());
    }

    if log.is_empty() {
        println!("No versions of {}", file.display());
        return Ok(());
    }

    let missing = session.store().missing_snapshots(log);
    for (i, entry) in log.iter().enumerate() {
        let flag = if missing.contains(&entry.timestamp) {
            "  [snapshot missing]"
        } else {
            ""
        };
        println!("{:>3}  {}  ({}){}", i + 1, entry.label(), entry.timestamp, flag);
    }
    Ok(())
}

/// Commit the file as a new version, or amend an existing one.
pub fn commit(
    config: &Config,
    file: &Path,
    message: &str,
    amend: Option<&str>,
) -> anyhow::Result<()> {
    let mut host = FileHost::open_existing(file)?;
    let mut session = open_session(config, &mut host)?;

    let target = match amend {
        Some(selector) => CommitTarget::Amend(resolve_version(session.log(), selector)?),
        None => CommitTarget::New,
    };

    let entry = session
        .commit(&mut host, target, message)
        .map_err(reported)?;

    let verb = match target {
        CommitTarget::New => "Committed",
        CommitTarget::Amend(_) => "Amended",
    };
    println!("{verb} {}", entry.label());
    Ok(())
}

/// Print a stored version's content.
pub fn show_version(config: &Config, file: &Path, version: &str) -> anyhow::Result<()> {
    let mut host = FileHost::open(file)?;
    let session = open_session(config, &mut host)?;
    let index = resolve_version(session.log(), version)?;
    let entry = session
        .log()
        .get(index)
        .context("Version disappeared from history")?;

    let content = session.store().read_snapshot(session.log(), &entry.timestamp)?;
    print!("{content}");
    Ok(())
}

/// Diff a version against the file, or two versions against each other.
pub fn diff(
    config: &Config,
    file: &Path,
    version: Option<&str>,
    against: Option<&str>,
) -> anyhow::Result<()> {
    let mut host = if against.is_some() {
        FileHost::open(file)?
    } else {
        FileHost::open_existing(file)?
    };
    let mut session = open_session(config, &mut host)?;

    let from = match version {
        Some(selector) => resolve_version(session.log(), selector)?,
        None => session.log().len().saturating_sub(1),
    };

    match against {
        Some(selector) => {
            let to = resolve_version(session.log(), selector)?;
            session
                .compare_versions(&mut host, from, to)
                .map_err(reported)?;
        }
        None => {
            session.show_diff(&mut host, from).map_err(reported)?;
        }
    }
    Ok(())
}

/// Restore a stored version into the file.
pub fn restore(config: &Config, file: &Path, version: &str) -> anyhow::Result<()> {
    let mut host = FileHost::open(file)?;
    let mut session = open_session(config, &mut host)?;
    let index = resolve_version(session.log(), version)?;

    session.load_version(&mut host, index).map_err(reported)?;
    host.save()?;

    if let Some(entry) = session.log().get(index) {
        println!("Restored {} to {}", host.path().display(), entry.label());
    }
    Ok(())
}

/// Print the version directory for a file.
pub fn show_dir(config: &Config, file: &Path) -> anyhow::Result<()> {
    let store = config.version_store()?;
    match store.derive_directory(Some(file)) {
        Some(directory) => {
            println!("{}", directory.display());
            Ok(())
        }
        None => bail!("{} has no file name to version", file.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use verso_history::VersionStore;

    fn log_with(messages: &[&str]) -> (TempDir, HistoryLog) {
        let dir = TempDir::new().unwrap();
        let store = VersionStore::new(dir.path());
        let mut log = store.load(Some(Path::new("/x/file.txt"))).log;
        for message in messages {
            store.commit(&mut log, "c", message).unwrap();
        }
        (dir, log)
    }

    #[test]
    fn test_resolve_by_number_and_latest() {
        let (_dir, log) = log_with(&["a", "b", "c"]);
        assert_eq!(resolve_version(&log, "1").unwrap(), 0);
        assert_eq!(resolve_version(&log, "3").unwrap(), 2);
        assert_eq!(resolve_version(&log, "latest").unwrap(), 2);
        assert!(resolve_version(&log, "0").is_err());
        assert!(resolve_version(&log, "4").is_err());
    }

    #[test]
    fn test_resolve_by_timestamp_and_label() {
        let (_dir, log) = log_with(&["only"]);
        let entry = log.get(0).unwrap();
        assert_eq!(resolve_version(&log, entry.timestamp.as_str()).unwrap(), 0);
        assert_eq!(resolve_version(&log, &entry.timestamp.readable()).unwrap(), 0);
        assert_eq!(resolve_version(&log, &entry.label()).unwrap(), 0);
    }

    #[test]
    fn test_resolve_on_empty_log() {
        let (_dir, log) = log_with(&[]);
        let err = resolve_version(&log, "latest").unwrap_err();
        assert_eq!(err.to_string(), "No versions recorded yet");
        assert!(resolve_version(&log, "nope").is_err());
    }
}
