//! CLI integration tests.
//!
//! These tests exercise the CLI commands end-to-end against a temporary
//! home directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn root(&self) -> PathBuf {
        self.home.path().join("history")
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.home.path().join(name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn verso(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_verso"))
            .args(args)
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("XDG_STATE_HOME", self.home.path().join(".state"))
            .env("VERSO_ROOT", self.root())
            .env_remove("VERSO_CONFIG_CONTENT")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute command")
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_command() {
    let env = Env::new();
    let output = env.verso(&["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Per-file version history"));
    for command in ["log", "commit", "show", "diff", "restore", "dir", "config"] {
        assert!(out.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_commit_log_show_round_trip() {
    let env = Env::new();
    let file = env.file("notes.txt", "first line\n");

    let output = env.verso(&["commit", arg(&file), "-m", "Initial"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("Committed "));

    let output = env.verso(&["log", arg(&file)]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("  1  "));
    assert!(out.contains(": Initial"));

    let output = env.verso(&["show", arg(&file), "1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "first line\n");

    let history = env.root().join("notes.txt").join("history.json");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(history).unwrap()).unwrap();
    assert_eq!(json[0]["message"], "Initial");
}

#[test]
fn test_diff_against_working_file() {
    let env = Env::new();
    let file = env.file("a.txt", "line1\nline2");
    assert!(env.verso(&["commit", arg(&file), "-m", "base"]).status.success());

    fs::write(&file, "line1\nline2X").unwrap();
    let output = env.verso(&["diff", arg(&file)]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "--- Previous Version\n+++ Current Version\n@@ -1,2 +1,2 @@\n line1\n-line2\n+line2X\n"
    );
}

#[test]
fn test_diff_without_versions_fails_with_notice() {
    let env = Env::new();
    let file = env.file("a.txt", "x");

    let output = env.verso(&["diff", arg(&file)]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("No versions available for comparison."));
    assert!(!stderr(&output).contains("command failed"));
}

#[test]
fn test_restore_writes_file() {
    let env = Env::new();
    let file = env.file("a.txt", "original");
    assert!(env.verso(&["commit", arg(&file), "-m", "keep"]).status.success());

    fs::write(&file, "scribbles").unwrap();
    let output = env.verso(&["restore", arg(&file), "latest"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&file).unwrap(), "original");
}

#[test]
fn test_empty_message_is_rejected() {
    let env = Env::new();
    let file = env.file("a.txt", "x");

    let output = env.verso(&["commit", arg(&file), "-m", ""]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Commit message cannot be empty."));
    assert!(!env.root().join("a.txt").exists());
}

#[test]
fn test_amend_unknown_version_fails() {
    let env = Env::new();
    let file = env.file("a.txt", "x");
    assert!(env.verso(&["commit", arg(&file), "-m", "one"]).status.success());

    let output = env.verso(&["commit", arg(&file), "-m", "two", "--amend", "7"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No version matches '7'"));
}

#[test]
fn test_dir_uses_base_name() {
    let env = Env::new();
    let output = env.verso(&["dir", "/some/where/report.md"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        env.root().join("report.md").display().to_string()
    );
}

#[test]
fn test_root_flag_overrides_env() {
    let env = Env::new();
    let custom = env.home.path().join("custom");
    let output = env.verso(&["--root", arg(&custom), "dir", "x.txt"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        custom.join("x.txt").display().to_string()
    );
}

#[test]
fn test_config_command_shows_root() {
    let env = Env::new();
    let output = env.verso(&["config"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Configuration sources:"));
    assert!(out.contains(&format!("History root: {}", env.root().display())));
}

#[test]
fn test_missing_explicit_config_fails() {
    let env = Env::new();
    let missing = env.home.path().join("nope.json");
    let output = env.verso(&["--config", arg(&missing), "config"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("config file not found"));
}
