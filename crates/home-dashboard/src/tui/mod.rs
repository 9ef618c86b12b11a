//! Terminal user interface.
//!
//! Built on ratatui and crossterm: a header with clock and greeting, a grid
//! of widget panels, a footer, and modal dialogs for settings and input.

pub mod app;
pub mod event;
pub mod modal;
pub mod theme;
pub mod ui;

#[cfg(test)]
mod test_utils;

pub use app::App;
