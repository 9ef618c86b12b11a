//! Platform-aware path resolution for home-dashboard.
//!
//! On **Linux**, follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/home-dashboard` or `~/.config/home-dashboard`
//! - Data (preferences): `$XDG_DATA_HOME/home-dashboard` or `~/.local/share/home-dashboard`
//! - State (logs): `$XDG_STATE_HOME/home-dashboard` or `~/.local/state/home-dashboard`
//!
//! On **macOS**, uses Apple conventions with XDG env var overrides:
//! - Config and data: `~/Library/Application Support/home-dashboard`
//! - State: `~/Library/Logs/home-dashboard`

use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "home-dashboard";

/// File name of the persisted preference store.
pub const STORE_FILE: &str = "preferences.json";

/// File name of the TUI log.
pub const LOG_FILE: &str = "homedash.log";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the configuration directory for home-dashboard.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/home-dashboard` (if env var set, any platform)
/// 2. Platform default:
///    - Linux: `~/.config/home-dashboard`
///    - macOS: `~/Library/Application Support/home-dashboard`
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    platform_config_dir().join(APP_NAME)
}

/// Platform-native config base directory (without XDG override).
fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::config_dir().unwrap_or_else(|| home_dir().join("Library/Application Support"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        home_dir().join(".config")
    }
}

/// Returns the path to the main configuration file.
///
/// Resolves to `config_dir()/config.toml`.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Returns the data directory holding the preference store.
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/home-dashboard`
/// 2. Platform default (`~/.local/share` on Linux, Application Support on macOS)
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    platform_data_dir().join(APP_NAME)
}

fn platform_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().unwrap_or_else(|| home_dir().join("Library/Application Support"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        home_dir().join(".local/share")
    }
}

/// Default location of the preference store.
pub fn store_path() -> PathBuf {
    data_dir().join(STORE_FILE)
}

/// Returns the state directory used for log files.
///
/// Resolution order:
/// 1. `$XDG_STATE_HOME/home-dashboard`
/// 2. Platform default (`~/.local/state` on Linux, `~/Library/Logs` on macOS)
pub fn state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join(APP_NAME);
    }
    platform_state_dir().join(APP_NAME)
}

fn platform_state_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir().join("Library/Logs")
    }
    #[cfg(not(target_os = "macos"))]
    {
        home_dir().join(".local/state")
    }
}

/// Default location of the TUI log file.
pub fn log_path() -> PathBuf {
    state_dir().join(LOG_FILE)
}

/// Expands a leading `~` in a path string to the user's home directory.
///
/// If the path does not start with `~`, it is returned as-is.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}

/// Creates a directory and all parent directories with mode 0700.
///
/// Equivalent to `mkdir -p` with restricted permissions.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

/// Creates the configuration directory if it does not exist, returning its path.
pub fn ensure_config_dir() -> std::io::Result<PathBuf> {
    let dir = config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}
