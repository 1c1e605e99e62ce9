//! Configuration management for verso.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/verso/config.json` (or `verso.jsonc`)
//! 2. Environment variable: `VERSO_CONFIG_CONTENT`
//! 3. An explicit config file (the CLI's `--config`)
//! 4. Environment overrides: `VERSO_ROOT`
//!
//! Supports JSONC (JSON with comments) and variable substitution:
//! - `{env:VAR_NAME}` - Substitute environment variable
//! - `{file:path}` - Substitute file contents

use crate::error::{ConfigError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use verso_history::{
    DiffEngine, VersionStore, DEFAULT_CONTEXT_LINES, DEFAULT_FROM_LABEL, DEFAULT_TO_LABEL,
};
use verso_util::LogLevel;

/// Inline config content, merged after the global file.
pub const CONFIG_CONTENT_ENV: &str = "VERSO_CONFIG_CONTENT";
/// Overrides the history root.
pub const ROOT_ENV: &str = "VERSO_ROOT";

static VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

fn var_regex() -> &'static regex::Regex {
    VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\{(env|file):([^}]+)\}")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Looks up an environment variable.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON Schema reference.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Directory holding every tracked file's history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<PathBuf>,

    /// Log level name (`trace` .. `error`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Diff presentation.
    pub diff: DiffConfig,
}

/// Diff presentation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Unchanged lines shown around each change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<usize>,

    /// Label of the stored side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_label: Option<String>,

    /// Label of the live side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_label: Option<String>,
}

impl DiffConfig {
    fn merge(self, other: Self) -> Self {
        Self {
            context_lines: other.context_lines.or(self.context_lines),
            from_label: other.from_label.or(self.from_label),
            to_label: other.to_label.or(self.to_label),
        }
    }
}

impl Config {
    /// Load configuration from all sources using the process environment.
    pub fn load(explicit: Option<&Path>) -> CoreResult<(Self, Vec<PathBuf>)> {
        let global_dir = Self::global_config_dir();
        Self::load_from(global_dir.as_deref(), explicit, &|name| std::env::var(name).ok())
    }

    /// Load configuration from the given global directory, explicit file and
    /// environment.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `global_dir`
    /// 2. `VERSO_CONFIG_CONTENT`
    /// 3. The explicit file, which must exist
    /// 4. `VERSO_ROOT`
    pub fn load_from(
        global_dir: Option<&Path>,
        explicit: Option<&Path>,
        env: EnvLookup<'_>,
    ) -> CoreResult<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(global_dir) = global_dir {
            for name in &["config.json", "verso.json", "verso.jsonc"] {
                let path = global_dir.join(name);
                if path.exists() {
                    let loaded = Self::load_file(&path, env)?;
                    config = config.merge(loaded);
                    sources.push(path);
                    break;
                }
            }
        }

        if let Some(content) = env(CONFIG_CONTENT_ENV) {
            let loaded = Self::parse_jsonc(&content, "<env>")?;
            config = config.merge(loaded);
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            let loaded = Self::load_file(path, env)?;
            config = config.merge(loaded);
            sources.push(path.to_path_buf());
        }

        if let Some(root) = env(ROOT_ENV).filter(|r| !r.is_empty()) {
            config.root_dir = Some(PathBuf::from(root));
        }

        tracing::debug!(sources = sources.len(), "Loaded configuration");
        Ok((config, sources))
    }

    /// Get the global config directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        verso_util::path::config_dir()
    }

    /// Load configuration from a file.
    pub fn load_file(path: &Path, env: EnvLookup<'_>) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let content = Self::substitute_variables(&content, path, env)?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Parse JSONC (JSON with comments).
    fn parse_jsonc(content: &str, source: &str) -> CoreResult<Self> {
        let stripped = Self::strip_comments(content);

        serde_json::from_str(&stripped).map_err(|e| {
            ConfigError::InvalidJson {
                path: source.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Strip `//` and `/* */` comments outside of strings.
    fn strip_comments(input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(c) = chars.next() {
            if escape_next {
                result.push(c);
                escape_next = false;
                continue;
            }

            if c == '\\' && in_string {
                result.push(c);
                escape_next = true;
                continue;
            }

            if c == '"' {
                in_string = !in_string;
                result.push(c);
                continue;
            }

            if in_string {
                result.push(c);
                continue;
            }

            if c == '/' {
                match chars.peek() {
                    Some('/') => {
                        chars.next();
                        for c in chars.by_ref() {
                            if c == '\n' {
                                result.push('\n');
                                break;
                            }
                        }
                        continue;
                    }
                    Some('*') => {
                        chars.next();
                        let mut prev = ' ';
                        for c in chars.by_ref() {
                            if prev == '*' && c == '/' {
                                break;
                            }
                            // Preserve newlines for error reporting
                            if c == '\n' {
                                result.push('\n');
                            }
                            prev = c;
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            result.push(c);
        }

        result
    }

    /// Substitute `{env:NAME}` and `{file:path}` references.
    ///
    /// File references resolve relative to the config file's directory.
    fn substitute_variables(
        content: &str,
        config_path: &Path,
        env: EnvLookup<'_>,
    ) -> CoreResult<String> {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut result = content.to_string();

        for cap in var_regex().captures_iter(content) {
            let (Some(full_match), Some(kind), Some(value)) = (cap.get(0), cap.get(1), cap.get(2))
            else {
                continue;
            };
            let value = value.as_str();

            let replacement = match kind.as_str() {
                "env" => env(value).ok_or_else(|| ConfigError::EnvVarNotFound {
                    name: value.to_string(),
                })?,
                "file" => {
                    let file_path = config_dir.join(value);
                    std::fs::read_to_string(&file_path)
                        .map(|v| v.trim().to_string())
                        .map_err(|_| ConfigError::FileRefNotFound {
                            path: file_path.display().to_string(),
                        })?
                }
                _ => continue,
            };

            result = result.replace(full_match.as_str(), &replacement);
        }

        Ok(result)
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(self, other: Self) -> Self {
        Self {
            schema: other.schema.or(self.schema),
            root_dir: other.root_dir.or(self.root_dir),
            log_level: other.log_level.or(self.log_level),
            diff: self.diff.merge(other.diff),
        }
    }

    /// The history root: configured, or `~/.version_control_text_editor`.
    pub fn history_root(&self) -> CoreResult<PathBuf> {
        if let Some(root) = &self.root_dir {
            return Ok(root.clone());
        }
        verso_util::path::history_root().ok_or_else(|| {
            ConfigError::InvalidPath("Could not determine home directory".to_string()).into()
        })
    }

    /// A version store at the configured root.
    pub fn version_store(&self) -> CoreResult<VersionStore> {
        Ok(VersionStore::new(self.history_root()?))
    }

    /// A diff engine with the configured context and labels.
    pub fn diff_engine(&self) -> DiffEngine {
        DiffEngine::new()
            .with_context_lines(self.diff.context_lines.unwrap_or(DEFAULT_CONTEXT_LINES))
            .with_labels(
                self.diff
                    .from_label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FROM_LABEL.to_string()),
                self.diff
                    .to_label
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TO_LABEL.to_string()),
            )
    }

    /// Configured log level; unknown names fall back to the default.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or_default()
    }
}
