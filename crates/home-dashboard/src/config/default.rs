//! Default configuration template and file creation utilities.
//!
//! Provides a commented TOML template that matches `Config::default()`
//! and functions to write it to the XDG config path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::ConfigError;
use crate::config::xdg;

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

/// A commented TOML template with all default values.
///
/// Every value here must match `Config::default()` from `schema.rs`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Home Dashboard Configuration
#
# This file was auto-generated with default values.
# All values shown below are the built-in defaults.
#
# Location: $XDG_CONFIG_HOME/home-dashboard/config.toml
# API credentials are not kept here. Set them with `homedash credentials set`.

# ==============================================================================
# Timers
# ==============================================================================

[dashboard]

# Interval between refreshes of every visible widget.
# Examples: "15m", "5m", "1h"
refresh_interval = "15m"

# Interval between clock redraws in the header.
clock_interval = "1s"

# ==============================================================================
# Weather
# ==============================================================================

[weather]

# "auto" looks the location up by IP address.
# Any other value is passed to the weather service verbatim:
# a city name ("Tokyo") or coordinates ("38.91,139.84").
location = "auto"

# Used when the automatic lookup fails or takes longer than locate_timeout.
fallback_location = "Sakata"
locate_timeout = "10s"

# ==============================================================================
# News
# ==============================================================================

[news]

# RSS feed shown by the news widget.
feed_url = "https://www.nhk.or.jp/rss/news/cat0.xml"

# Number of headlines shown.
max_items = 10

# ==============================================================================
# Transit
# ==============================================================================

[transit]

# RSS feed of the transit operator.
feed_url = "https://traininfo.jreast.co.jp/train_info/rss/tohoku.xml"

# Items whose title contains this text report normal service and are hidden.
normal_marker = "平常運転"

# Linked from the panel when the feed cannot be read.
status_page = "https://traininfo.jreast.co.jp/train_info/tohoku.aspx"

# Region name shown in the panel title.
area_name = "Tohoku"

# ==============================================================================
# Calendar
# ==============================================================================

[calendar]

# Maximum number of upcoming events requested.
max_results = 7

# ==============================================================================
# Photo frame
# ==============================================================================

[photo]

# Photo shown at startup. Empty means none until one is chosen.
# Tilde (~) is expanded to the home directory.
path = ""

# ==============================================================================
# Remote services
# ==============================================================================

[endpoints]

weather = "https://wttr.in"
rss_converter = "https://api.rss2json.com/v1/api.json"
calendar = "https://www.googleapis.com/calendar/v3"
geolocation = "https://ipinfo.io/json"

# Upper bound on any single request.
request_timeout = "20s"

# ==============================================================================
# Storage
# ==============================================================================

[storage]

# Preference store (theme, visible widgets, credentials, tasks, events).
# Empty means $XDG_DATA_HOME/home-dashboard/preferences.json
path = ""

# ==============================================================================
# Logging
# ==============================================================================

[logging]

# Options: "error", "warn", "info", "debug", "trace"
# HOMEDASH_LOG overrides this (e.g. HOMEDASH_LOG=home_dashboard=debug).
level = "info"

# Log file used while the dashboard is on screen.
# Empty means $XDG_STATE_HOME/home-dashboard/homedash.log
file = ""
"#;

// ---------------------------------------------------------------------------
// File creation functions
// ---------------------------------------------------------------------------

/// Creates (or force-overwrites) the default config file.
///
/// - If the file exists and `force` is `false`, returns `ConfigError::AlreadyExists`.
/// - If the file exists and `force` is `true`, backs it up to `.toml.backup` first.
/// - Returns the path where the config was written.
pub fn create_default_config(force: bool) -> Result<PathBuf, ConfigError> {
    let path = xdg::config_path();

    if path.exists() {
        if !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        let backup_path = path.with_extension("toml.backup");
        fs::rename(&path, &backup_path).map_err(|e| ConfigError::WriteError {
            path: backup_path.clone(),
            source: e,
        })?;
        tracing::info!("Backed up existing config to {}", backup_path.display());
    }

    write_default_config(&path)?;
    tracing::info!("Created default configuration at {}", path.display());
    Ok(path)
}

/// Writes the default template to `path`, creating parent dirs and setting 0600 permissions.
fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_error = |e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };

    xdg::ensure_config_dir().map_err(write_error)?;
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(write_error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(write_error)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Config;
    use serial_test::serial;

    /// Run closure with `XDG_CONFIG_HOME` temporarily pointed at `dir`.
    fn with_xdg_config<F: FnOnce()>(dir: &Path, f: F) {
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("XDG_CONFIG_HOME", dir);
        f();
        match original {
            Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    // -- Template validity --------------------------------------------------

    #[test]
    fn template_values_match_config_default() {
        let from_template: Config =
            toml::from_str(DEFAULT_CONFIG_TEMPLATE).expect("template should parse");
        assert_eq!(from_template, Config::default());
    }

    #[test]
    fn template_contains_all_section_headers() {
        for section in [
            "[dashboard]",
            "[weather]",
            "[news]",
            "[transit]",
            "[calendar]",
            "[photo]",
            "[endpoints]",
            "[storage]",
            "[logging]",
        ] {
            assert!(
                DEFAULT_CONFIG_TEMPLATE.contains(section),
                "missing {section} section"
            );
        }
    }

    #[test]
    fn template_is_commented() {
        let comment_lines = DEFAULT_CONFIG_TEMPLATE
            .lines()
            .filter(|l| l.trim_start().starts_with('#'))
            .count();
        assert!(comment_lines > 20, "expected >20 comment lines, got {comment_lines}");
    }

    // -- create_default_config ----------------------------------------------

    #[test]
    #[serial]
    fn create_writes_template_at_xdg_path() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let expected = tmp.path().join("home-dashboard/config.toml");
        with_xdg_config(tmp.path(), || {
            let path = create_default_config(false).expect("should succeed");
            assert_eq!(path, expected);
            let content = fs::read_to_string(&path).expect("should read");
            assert_eq!(content, DEFAULT_CONFIG_TEMPLATE);
        });
    }

    #[test]
    #[serial]
    fn create_without_force_returns_already_exists() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        with_xdg_config(tmp.path(), || {
            create_default_config(false).expect("first call should succeed");
            let err = create_default_config(false).expect_err("should fail with AlreadyExists");
            assert!(matches!(err, ConfigError::AlreadyExists { .. }), "got {err:?}");
        });
    }

    #[test]
    #[serial]
    fn create_with_force_creates_backup() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        with_xdg_config(tmp.path(), || {
            let path = create_default_config(false).expect("first call should succeed");
            fs::write(&path, "# custom content\n").expect("overwrite for test");

            let new_path = create_default_config(true).expect("force should succeed");
            assert_eq!(new_path, path);

            let backup = path.with_extension("toml.backup");
            let backup_content = fs::read_to_string(&backup).expect("read backup");
            assert_eq!(backup_content, "# custom content\n");

            let content = fs::read_to_string(&path).expect("read new");
            assert_eq!(content, DEFAULT_CONFIG_TEMPLATE);
        });
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        with_xdg_config(tmp.path(), || {
            let path = create_default_config(false).expect("should succeed");
            let mode = fs::metadata(&path).expect("metadata").permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "file should be owner-only read/write");
        });
    }
}
