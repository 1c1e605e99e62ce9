//! Path utilities.
//!
//! Per-user locations for version history, configuration and logs.

use std::path::{Path, PathBuf};

/// Name of the per-user directory holding every tracked file's history.
pub const HISTORY_DIR_NAME: &str = ".version_control_text_editor";

/// Get the user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Get the default history root: `~/.version_control_text_editor`.
pub fn history_root() -> Option<PathBuf> {
    home_dir().map(|home| history_root_in(&home))
}

/// History root below an arbitrary home directory.
pub fn history_root_in(home: &Path) -> PathBuf {
    home.join(HISTORY_DIR_NAME)
}

/// Get the verso configuration directory.
///
/// On Unix, prefers `~/.config/verso` when it exists, falling back to the
/// platform configuration directory otherwise.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        if let Some(home) = dirs::home_dir() {
            let xdg_config = home.join(".config").join("verso");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }
    }

    dirs::config_dir().map(|d| d.join("verso"))
}

/// Get the log directory path.
pub fn logs_dir() -> PathBuf {
    // macOS: ~/Library/Logs/verso
    // Linux: ~/.local/state/verso/logs
    // Windows: %LOCALAPPDATA%/verso/logs

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library/Logs/verso");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(state_dir) = dirs::state_dir() {
            return state_dir.join("verso/logs");
        }
        if let Some(home) = dirs::home_dir() {
            return home.join(".local/state/verso/logs");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(local_app) = dirs::data_local_dir() {
            return local_app.join("verso/logs");
        }
    }

    PathBuf::from(".verso/logs")
}
