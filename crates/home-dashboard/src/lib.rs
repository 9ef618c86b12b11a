//! Home Dashboard library
//!
//! A terminal home dashboard that renders swappable widgets (weather, news,
//! transit status, calendar, notifications, reminders, music, photo frame,
//! media player), persists user preferences locally, and refreshes remote
//! data on a fixed schedule.
//!
//! # Architecture
//!
//! - [`store`] — key-value preference port and its typed layer.
//! - [`widgets`] — the `Widget` capability, static descriptor table, registry.
//! - [`renderer`] — visibility plan and one refresh cycle over visible widgets.
//! - [`scheduler`] — refresh/clock timers and in-flight suppression.
//! - [`greeting`] — contextual greeting over the aggregated state.
//! - [`tui`] — ratatui front-end.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configuration file schema, loader, and XDG path resolution.
pub mod config;

/// Contextual greeting composition.
pub mod greeting;

/// Tracing subscriber setup.
pub mod logging;

/// Visibility plan and refresh cycle execution.
pub mod renderer;

/// Periodic timers and refresh gating.
pub mod scheduler;

/// Aggregated transient dashboard state.
pub mod state;

/// Persisted user preferences.
pub mod store;

/// Terminal user interface.
pub mod tui;

/// Widget capability, registry, and the built-in widgets.
pub mod widgets;

#[cfg(test)]
mod test_utils;

pub use state::DashboardState;

/// A reminder entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// What to do.
    pub text: String,
    /// Whether the task has been ticked off.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Creates an open task.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// An event kept locally for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEvent {
    /// Millisecond timestamp at creation, unique within the day's list.
    pub id: i64,
    /// Event description.
    pub text: String,
}

/// Colour scheme of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light text on a dark background.
    #[default]
    Dark,
    /// Dark text on a light background.
    Light,
}

impl Theme {
    /// Returns the other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Stable persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing [`Theme`] from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseThemeError(pub String);

impl fmt::Display for ParseThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid theme: {} (expected dark or light)", self.0)
    }
}

impl std::error::Error for ParseThemeError {}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_toggles_between_variants() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(" dark ".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn task_deserializes_without_completed_flag() {
        let task: Task = serde_json::from_str(r#"{"text": "buy milk"}"#).expect("parses");
        assert_eq!(task, Task::new("buy milk"));
    }

    #[test]
    fn local_event_serializes_with_numeric_id() {
        let event = LocalEvent {
            id: 1_760_000_000_000,
            text: "Call mom".to_string(),
        };
        let json = serde_json::to_string(&event).expect("serializes");
        assert_eq!(json, r#"{"id":1760000000000,"text":"Call mom"}"#);
    }
}
