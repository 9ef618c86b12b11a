//! Event handling for the TUI.
//!
//! Merges terminal input with the scheduler's timers and finished refresh
//! cycles, and maps dashboard keys to actions.

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::renderer::CycleReport;
use crate::scheduler::{Scheduler, Tick};

/// Application-level event variants.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// A scheduler timer fired.
    Tick(Tick),
    /// A refresh cycle finished.
    Cycle(Box<CycleReport>),
}

/// Waits on terminal input, the timers and the cycle channel.
pub struct EventHandler {
    scheduler: Scheduler,
    reports: mpsc::Receiver<CycleReport>,
}

impl EventHandler {
    /// Creates a handler over `scheduler` and the receiving end of the
    /// cycle channel.
    pub fn new(scheduler: Scheduler, reports: mpsc::Receiver<CycleReport>) -> Self {
        Self { scheduler, reports }
    }

    /// Waits for the next event.
    pub async fn next(&mut self, reader: &mut EventStream) -> std::io::Result<Event> {
        loop {
            tokio::select! {
                maybe_event = reader.next() => {
                    match maybe_event {
                        Some(Ok(CrosstermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            return Ok(Event::Key(key));
                        }
                        Some(Ok(CrosstermEvent::Resize(w, h))) => return Ok(Event::Resize(w, h)),
                        Some(Err(e)) => return Err(e),
                        // Key releases, mouse, focus and paste
                        Some(Ok(_)) => continue,
                        None => return Err(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "event stream ended",
                        )),
                    }
                }
                Some(report) = self.reports.recv() => return Ok(Event::Cycle(Box::new(report))),
                tick = self.scheduler.next() => return Ok(Event::Tick(tick)),
            }
        }
    }
}

/// Action produced by a key on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No action to take.
    None,
    /// Quit the application.
    Quit,
    /// Switch between dark and light.
    ToggleTheme,
    /// Open the credentials dialog.
    OpenCredentials,
    /// Open the widget-toggle dialog.
    OpenWidgetToggles,
    /// Start a refresh cycle now.
    Refresh,
    /// Focus the next panel.
    FocusNext,
    /// Focus the previous panel.
    FocusPrevious,
    /// Move the row selection down.
    SelectNext,
    /// Move the row selection up.
    SelectPrevious,
    /// Show the next tab of the focused panel.
    NextTab,
    /// Show the previous tab of the focused panel.
    PreviousTab,
    /// Open the selected link or file.
    Open,
    /// Copy the selected link.
    Copy,
    /// Tick or untick the selected task.
    ToggleTask,
    /// Delete the selected task or local event.
    Delete,
    /// Open the focused panel's add dialog.
    Add,
}

/// Maps a key on the dashboard (no modal open) to an action.
pub fn handle_key_event(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('s') => Action::OpenCredentials,
        KeyCode::Char('w') => Action::OpenWidgetToggles,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrevious,
        KeyCode::Char('j') | KeyCode::Down => Action::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => Action::SelectPrevious,
        KeyCode::Char('l') | KeyCode::Right => Action::NextTab,
        KeyCode::Char('h') | KeyCode::Left => Action::PreviousTab,
        KeyCode::Enter | KeyCode::Char('o') => Action::Open,
        KeyCode::Char('y') => Action::Copy,
        KeyCode::Char(' ') => Action::ToggleTask,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Char('a') => Action::Add,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_keys() {
        assert_eq!(handle_key_event(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn dashboard_bindings() {
        let cases = [
            (KeyCode::Char('t'), Action::ToggleTheme),
            (KeyCode::Char('s'), Action::OpenCredentials),
            (KeyCode::Char('w'), Action::OpenWidgetToggles),
            (KeyCode::Char('r'), Action::Refresh),
            (KeyCode::Tab, Action::FocusNext),
            (KeyCode::BackTab, Action::FocusPrevious),
            (KeyCode::Char('j'), Action::SelectNext),
            (KeyCode::Up, Action::SelectPrevious),
            (KeyCode::Char('l'), Action::NextTab),
            (KeyCode::Char('h'), Action::PreviousTab),
            (KeyCode::Enter, Action::Open),
            (KeyCode::Char('o'), Action::Open),
            (KeyCode::Char('y'), Action::Copy),
            (KeyCode::Char(' '), Action::ToggleTask),
            (KeyCode::Char('d'), Action::Delete),
            (KeyCode::Char('a'), Action::Add),
        ];
        for (code, action) in cases {
            assert_eq!(handle_key_event(press(code)), action, "{code:?}");
        }
    }

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(handle_key_event(press(KeyCode::Char('z'))), Action::None);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            Action::None
        );
    }
}
