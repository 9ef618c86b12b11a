//! Application state and main event loop for the TUI.
//!
//! Manages terminal setup/teardown, the panic hook, refresh cycles and the
//! render loop. Refresh cycles run on their own task; local edits (tasks,
//! local events) update panels and the greeting directly.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{EventStream, KeyEvent};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use home_feeds::FeedClient;
use ratatui::prelude::{CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::config::xdg::expand_tilde;
use crate::greeting::{self, Greeting};
use crate::renderer::{self, CycleReport};
use crate::scheduler::{RefreshGate, Scheduler, Tick, Trigger};
use crate::state::DashboardState;
use crate::store::{Preferences, StoreError};
use crate::tui::event::{handle_key_event, Action, Event, EventHandler};
use crate::tui::modal::{CredentialsForm, Modal, ModalOutcome, WidgetToggles};
use crate::tui::ui::render_dashboard;
use crate::widgets::calendar::{self, shows_sync_failure};
use crate::widgets::reminder;
use crate::widgets::{
    descriptor, InputKind, RefreshContext, RowKey, ViewRow, WidgetId, WidgetRegistry, WidgetView,
};
use crate::Theme;

/// How long a footer status message stays up.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// One visible panel and its cursor.
#[derive(Debug, Clone)]
pub struct Panel {
    /// Widget shown in the panel.
    pub id: WidgetId,
    /// Content from the latest refresh.
    pub view: WidgetView,
    /// Selected tab, for tabbed views.
    pub tab: usize,
    /// Selected row within the visible rows.
    pub selected: usize,
}

impl Panel {
    fn loading(id: WidgetId) -> Self {
        Self {
            id,
            view: WidgetView::new(descriptor(id).display_name).with_row(ViewRow::text("Loading…")),
            tab: 0,
            selected: 0,
        }
    }

    fn replace_view(&mut self, view: WidgetView) {
        self.view = view;
        if !self.view.tabs.is_empty() {
            self.tab = self.tab.min(self.view.tabs.len() - 1);
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let rows = self.view.visible_rows(self.tab).len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    /// Row under the cursor.
    pub fn selected_row(&self) -> Option<&ViewRow> {
        self.view.visible_rows(self.tab).get(self.selected)
    }
}

/// A refresh cycle ready to run off the UI task.
pub struct CycleJob {
    registry: Arc<WidgetRegistry>,
    shown: Vec<WidgetId>,
    ctx: RefreshContext,
    trigger: Trigger,
}

impl CycleJob {
    /// Why the cycle was started.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Runs the cycle to completion.
    pub async fn run(self) -> CycleReport {
        tracing::debug!(trigger = %self.trigger, "refresh cycle");
        renderer::run_cycle(&self.registry, &self.shown, &self.ctx).await
    }
}

/// Core application state for the TUI.
pub struct App {
    /// Whether the application should exit.
    pub should_quit: bool,
    prefs: Preferences,
    registry: Arc<WidgetRegistry>,
    client: FeedClient,
    /// Active colour scheme.
    pub theme: Theme,
    /// Visible panels in registry order.
    pub panels: Vec<Panel>,
    /// Index of the focused panel.
    pub focus: usize,
    /// State from the latest refresh cycle.
    pub state: DashboardState,
    /// Greeting shown in the header.
    pub greeting: Greeting,
    /// Time shown by the header clock.
    pub now: DateTime<Local>,
    /// Open dialog, if any.
    pub modal: Option<Modal>,
    /// Temporary footer message with its expiry.
    pub status_message: Option<(String, Instant)>,
    /// Photo chosen for the frame.
    pub photo: Option<PathBuf>,
    /// File chosen for the media player.
    pub media: Option<PathBuf>,
    gate: RefreshGate,
}

impl App {
    /// Creates the app and lays out panels from the stored visibility map.
    pub fn new(
        prefs: Preferences,
        registry: WidgetRegistry,
        client: FeedClient,
    ) -> Result<Self, StoreError> {
        let visibility = prefs.load_visibility()?;
        let plan = renderer::plan(&registry, &visibility);
        let now = Local::now();
        let state = DashboardState::default();
        let greeting = greeting::compose(&state, &prefs.tasks(), &now);
        Ok(Self {
            should_quit: false,
            theme: prefs.theme(),
            prefs,
            registry: Arc::new(registry),
            client,
            panels: plan.shown.into_iter().map(Panel::loading).collect(),
            focus: 0,
            state,
            greeting,
            now,
            modal: None,
            status_message: None,
            photo: None,
            media: None,
            gate: RefreshGate::new(),
        })
    }

    /// Preference store backing the app.
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// The focused panel.
    pub fn focused_panel(&self) -> Option<&Panel> {
        self.panels.get(self.focus)
    }

    /// Panel showing `id`, if visible.
    pub fn panel(&self, id: WidgetId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id == id)
    }

    fn panel_mut(&mut self, id: WidgetId) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id == id)
    }

    /// Whether a refresh cycle is running.
    pub fn is_refreshing(&self) -> bool {
        self.gate.is_in_flight()
    }

    /// Shows `message` in the footer for a few seconds.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now() + STATUS_MESSAGE_TTL));
    }

    /// Clears the status message if its expiry time has passed.
    pub fn expire_status_message(&mut self) {
        if let Some((_, expiry)) = &self.status_message {
            if Instant::now() >= *expiry {
                self.status_message = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Refresh cycles
    // -----------------------------------------------------------------------

    /// Asks the gate for a cycle. Returns the job to run when admitted.
    pub fn request_refresh(&mut self, trigger: Trigger) -> Option<CycleJob> {
        if !self.gate.request(trigger) {
            return None;
        }
        Some(self.build_job(trigger))
    }

    fn build_job(&self, trigger: Trigger) -> CycleJob {
        let ctx = renderer::snapshot(
            &self.prefs,
            self.client.clone(),
            self.photo.clone(),
            self.media.clone(),
            Local::now(),
        );
        CycleJob {
            registry: Arc::clone(&self.registry),
            shown: self.panels.iter().map(|p| p.id).collect(),
            ctx,
            trigger,
        }
    }

    /// Swaps in the results of a finished cycle. Returns the deferred
    /// re-run, if one was requested meanwhile.
    pub fn apply_report(&mut self, report: CycleReport) -> Option<CycleJob> {
        for (id, view) in report.views {
            if let Some(panel) = self.panel_mut(id) {
                panel.replace_view(view);
            }
        }
        self.state = report.state;
        if !report.failures.is_empty() {
            tracing::debug!(count = report.failures.len(), "cycle finished with failures");
        }
        // The cycle saw tasks and local events as they were when it started.
        self.refresh_local();
        self.gate.finish().map(|trigger| self.build_job(trigger))
    }

    /// Advances the header clock and re-derives the greeting.
    pub fn tick_clock(&mut self, now: DateTime<Local>) {
        self.now = now;
        self.greeting = greeting::compose(&self.state, &self.prefs.tasks(), &self.now);
        self.expire_status_message();
    }

    /// Re-renders the panels backed by local data and recomputes the
    /// greeting without a network round-trip.
    pub fn refresh_local(&mut self) {
        let tasks = self.prefs.tasks();
        if let Some(panel) = self.panel_mut(WidgetId::Reminder) {
            panel.replace_view(reminder::render(&tasks));
        }

        let events = self.prefs.local_events(self.now.date_naive());
        let local_calendar = self
            .panel(WidgetId::Calendar)
            .filter(|p| p.view.input == Some(InputKind::AddEvent))
            .map(|p| shows_sync_failure(&p.view));
        if let Some(sync_failed) = local_calendar {
            let notice = sync_failed.then_some(calendar::SYNC_FAILED);
            let view = calendar::local_view(&events, notice);
            if let Some(panel) = self.panel_mut(WidgetId::Calendar) {
                panel.replace_view(view);
            }
            self.state.local_events = events;
        }

        self.greeting = greeting::compose(&self.state, &tasks, &self.now);
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Moves focus to the next panel, wrapping.
    pub fn focus_next(&mut self) {
        if !self.panels.is_empty() {
            self.focus = (self.focus + 1) % self.panels.len();
        }
    }

    /// Moves focus to the previous panel, wrapping.
    pub fn focus_previous(&mut self) {
        if !self.panels.is_empty() {
            self.focus = (self.focus + self.panels.len() - 1) % self.panels.len();
        }
    }

    /// Moves the row cursor down, clamped to the last row.
    pub fn select_next(&mut self) {
        if let Some(panel) = self.panels.get_mut(self.focus) {
            panel.selected += 1;
            panel.clamp_selection();
        }
    }

    /// Moves the row cursor up, clamped to the first row.
    pub fn select_previous(&mut self) {
        if let Some(panel) = self.panels.get_mut(self.focus) {
            panel.selected = panel.selected.saturating_sub(1);
        }
    }

    /// Cycles the focused panel's tabs forward or backward.
    pub fn switch_tab(&mut self, forward: bool) {
        let Some(panel) = self.panels.get_mut(self.focus) else {
            return;
        };
        let count = panel.view.tabs.len();
        if count == 0 {
            return;
        }
        panel.tab = if forward {
            (panel.tab + 1) % count
        } else {
            (panel.tab + count - 1) % count
        };
        panel.selected = 0;
    }

    fn selected_key(&self) -> Option<RowKey> {
        self.focused_panel()?.selected_row()?.key
    }

    fn selected_link(&self) -> Option<String> {
        self.focused_panel()?.selected_row()?.link.clone()
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Handles a key press, routing it to the open modal if there is one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<CycleJob> {
        if let Some(modal) = self.modal.as_mut() {
            let outcome = modal.handle_key(key);
            return self.apply_modal_outcome(outcome);
        }
        self.dispatch(handle_key_event(key))
    }

    /// Performs a dashboard action.
    pub fn dispatch(&mut self, action: Action) -> Option<CycleJob> {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::ToggleTheme => match self.prefs.toggle_theme() {
                Ok(theme) => self.theme = theme,
                Err(e) => self.report_store_error(e),
            },
            Action::OpenCredentials => {
                let (api_key, calendar_id) = self.prefs.raw_credentials();
                self.modal = Some(Modal::Credentials(CredentialsForm::new(&api_key, &calendar_id)));
            }
            Action::OpenWidgetToggles => {
                self.modal = Some(Modal::Widgets(WidgetToggles::new(&self.prefs.visibility())));
            }
            Action::Refresh => return self.request_refresh(Trigger::Manual),
            Action::FocusNext => self.focus_next(),
            Action::FocusPrevious => self.focus_previous(),
            Action::SelectNext => self.select_next(),
            Action::SelectPrevious => self.select_previous(),
            Action::NextTab => self.switch_tab(true),
            Action::PreviousTab => self.switch_tab(false),
            Action::Open => self.open_selected(),
            Action::Copy => self.copy_selected(),
            Action::ToggleTask => self.toggle_selected_task(),
            Action::Delete => self.delete_selected(),
            Action::Add => {
                if let Some(kind) = self.focused_panel().and_then(|p| p.view.input) {
                    self.modal = Some(Modal::input(kind));
                }
            }
        }
        None
    }

    fn apply_modal_outcome(&mut self, outcome: ModalOutcome) -> Option<CycleJob> {
        match outcome {
            ModalOutcome::Continue => None,
            ModalOutcome::Close => {
                self.modal = None;
                None
            }
            ModalOutcome::SaveCredentials {
                api_key,
                calendar_id,
            } => {
                self.modal = None;
                let saved = if api_key.trim().is_empty() && calendar_id.trim().is_empty() {
                    self.prefs.clear_credentials()
                } else {
                    self.prefs.set_credentials(&api_key, &calendar_id)
                };
                match saved {
                    Ok(()) => {
                        self.set_status("Calendar settings saved");
                        self.request_refresh(Trigger::SettingsChanged)
                    }
                    Err(e) => {
                        self.report_store_error(e);
                        None
                    }
                }
            }
            ModalOutcome::SetVisible(id, visible) => self.set_widget_visible(id, visible),
            ModalOutcome::Submit(kind, text) => {
                self.modal = None;
                self.submit_input(kind, &text)
            }
        }
    }

    /// Persists a visibility change, re-plans the panels and refreshes.
    pub fn set_widget_visible(&mut self, id: WidgetId, visible: bool) -> Option<CycleJob> {
        let visibility = match self.prefs.set_widget_visible(id, visible) {
            Ok(map) => map,
            Err(e) => {
                self.report_store_error(e);
                return None;
            }
        };
        let plan = renderer::plan(&self.registry, &visibility);
        let mut previous = std::mem::take(&mut self.panels);
        self.panels = plan
            .shown
            .into_iter()
            .map(|shown| match previous.iter().position(|p| p.id == shown) {
                Some(index) => previous.swap_remove(index),
                None => Panel::loading(shown),
            })
            .collect();
        self.focus = self.focus.min(self.panels.len().saturating_sub(1));
        self.request_refresh(Trigger::VisibilityChanged)
    }

    fn submit_input(&mut self, kind: InputKind, text: &str) -> Option<CycleJob> {
        match kind {
            InputKind::AddTask => {
                if let Err(e) = self.prefs.add_task(text) {
                    self.report_store_error(e);
                }
                self.refresh_local();
                None
            }
            InputKind::AddEvent => {
                let today = self.now.date_naive();
                let now_ms = Local::now().timestamp_millis();
                if let Err(e) = self.prefs.add_local_event(today, text, now_ms) {
                    self.report_store_error(e);
                }
                self.refresh_local();
                None
            }
            InputKind::ChoosePhoto => {
                self.photo = Some(expand_tilde(text));
                self.request_refresh(Trigger::Manual)
            }
            InputKind::ChooseMedia => {
                self.media = Some(expand_tilde(text));
                self.request_refresh(Trigger::Manual)
            }
        }
    }

    fn toggle_selected_task(&mut self) {
        let Some(RowKey::Task(index)) = self.selected_key() else {
            return;
        };
        if let Err(e) = self.prefs.toggle_task(index) {
            self.report_store_error(e);
        }
        self.refresh_local();
    }

    fn delete_selected(&mut self) {
        let result = match self.selected_key() {
            Some(RowKey::Task(index)) => self.prefs.remove_task(index).map(|_| ()),
            Some(RowKey::LocalEvent(id)) => self
                .prefs
                .remove_local_event(self.now.date_naive(), id)
                .map(|_| ()),
            None => return,
        };
        if let Err(e) = result {
            self.report_store_error(e);
        }
        self.refresh_local();
    }

    fn open_selected(&mut self) {
        let Some(link) = self.selected_link() else {
            return;
        };
        match open::that_detached(&link) {
            Ok(()) => tracing::debug!(%link, "opened"),
            Err(e) => {
                tracing::warn!(%link, error = %e, "failed to open");
                self.set_status(format!("Could not open {link}: {e}"));
            }
        }
    }

    fn copy_selected(&mut self) {
        let Some(link) = self.selected_link() else {
            return;
        };
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(link)) {
            Ok(()) => self.set_status("Copied link"),
            Err(e) => {
                tracing::warn!("failed to copy to clipboard: {}", e);
                self.set_status(format!("Copy failed: {e}"));
            }
        }
    }

    fn report_store_error(&mut self, error: StoreError) {
        tracing::warn!(error = %error, "preference write failed");
        self.set_status(format!("Could not save: {error}"));
    }

    // -----------------------------------------------------------------------
    // Terminal loop
    // -----------------------------------------------------------------------

    /// Runs the TUI: sets up the terminal, runs the loop, restores on exit.
    pub async fn run(&mut self, scheduler: Scheduler) -> io::Result<()> {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = restore_terminal();
            original_hook(panic_info);
        }));

        setup_terminal()?;
        let result = self.event_loop(scheduler).await;
        restore_terminal()?;
        result
    }

    async fn event_loop(&mut self, scheduler: Scheduler) -> io::Result<()> {
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;
        let (report_tx, report_rx) = mpsc::channel::<CycleReport>(4);
        let mut events = EventHandler::new(scheduler, report_rx);
        let mut reader = EventStream::new();

        if let Some(job) = self.request_refresh(Trigger::Startup) {
            spawn_cycle(job, report_tx.clone());
        }

        loop {
            terminal.draw(|frame| render_dashboard(frame, self))?;

            let job = match events.next(&mut reader).await? {
                Event::Key(key) => self.handle_key(key),
                Event::Resize(_, _) => None,
                Event::Tick(Tick::Clock) => {
                    self.tick_clock(Local::now());
                    None
                }
                Event::Tick(Tick::Refresh) => self.request_refresh(Trigger::Scheduled),
                Event::Cycle(report) => self.apply_report(*report),
            };
            if let Some(job) = job {
                spawn_cycle(job, report_tx.clone());
            }
            if self.should_quit {
                return Ok(());
            }
        }
    }
}

fn spawn_cycle(job: CycleJob, reports: mpsc::Sender<CycleReport>) {
    tokio::spawn(async move {
        let report = job.run().await;
        if reports.send(report).await.is_err() {
            tracing::debug!("dashboard closed before the cycle finished");
        }
    });
}

/// Enables raw mode and switches to the alternate screen.
fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    Ok(())
}

/// Restores the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}
