//! Shared helpers for TUI tests with ratatui's `TestBackend`.

use chrono::{Local, TimeZone};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

use crate::config::Config;
use crate::store::Preferences;
use crate::test_utils::client_at;
use crate::tui::App;
use crate::widgets::{WidgetId, WidgetRegistry};

/// Creates a Terminal with TestBackend at the specified dimensions.
pub fn test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(width, height)).expect("failed to create test terminal")
}

/// App over an in-memory store with `extra` shown besides the defaults,
/// clock set to Monday 2 June 2025, 09:00.
pub fn test_app(extra: &[WidgetId]) -> App {
    let prefs = Preferences::in_memory();
    for id in extra {
        prefs.set_widget_visible(*id, true).expect("toggle");
    }
    let registry = WidgetRegistry::from_config(&Config::default());
    let mut app = App::new(prefs, registry, client_at("http://127.0.0.1:9")).expect("app");
    let now = Local
        .with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid time");
    app.tick_clock(now);
    app
}

/// Extracts all text from a specific row in the buffer as a single String.
pub fn row_text(buffer: &Buffer, row: u16) -> String {
    let area = buffer.area();
    if row >= area.height {
        return String::new();
    }
    (0..area.width)
        .map(|col| buffer.cell((col, row)).map(|cell| cell.symbol()).unwrap_or(" "))
        .collect()
}

/// Finds the first row index that contains the given text.
pub fn find_row_with_text(buffer: &Buffer, text: &str) -> Option<u16> {
    (0..buffer.area().height).find(|row| row_text(buffer, *row).contains(text))
}
