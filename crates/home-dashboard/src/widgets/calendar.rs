//! Calendar panel.
//!
//! With credentials the panel lists upcoming events from the remote
//! calendar. Without them, or when the remote read fails, it falls back to
//! the locally kept list for today, which the user can edit.

use std::fmt::Display;

use chrono::{Local, TimeZone, Utc};
use futures::future::{BoxFuture, FutureExt};
use home_feeds::{CalendarEvent, EventStart};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::view::{dim_style, strong_style};
use super::{
    InputKind, RefreshContext, RowKey, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate,
    WidgetView,
};
use crate::config::Config;
use crate::state::StatePatch;
use crate::LocalEvent;

const TITLE: &str = "Calendar";

/// Notice shown above the local list when the remote read failed.
pub const SYNC_FAILED: &str = "Calendar sync failed; showing today's local events.";

/// Widget for upcoming events.
pub struct CalendarWidget {
    max_results: u32,
}

impl CalendarWidget {
    /// Creates a widget requesting at most `max_results` remote events.
    pub fn new(max_results: u32) -> Self {
        Self { max_results }
    }
}

/// Factory used by the descriptor table.
pub fn create(config: &Config) -> Box<dyn Widget> {
    Box::new(CalendarWidget::new(config.calendar.max_results))
}

impl Widget for CalendarWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Calendar
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let Some(credentials) = &ctx.credentials else {
                return Ok(local_update(&ctx.local_events, None));
            };
            let from = ctx.now.with_timezone(&Utc);
            match ctx
                .client
                .calendar_events(credentials, from, self.max_results)
                .await
            {
                Ok(events) => Ok(WidgetUpdate::with_patch(
                    remote_view(&events, &Local),
                    StatePatch::RemoteCalendar(events),
                )),
                Err(e) => {
                    tracing::warn!(error = %e, "calendar sync failed, using local events");
                    Ok(local_update(&ctx.local_events, Some(SYNC_FAILED)))
                }
            }
        }
        .boxed()
    }
}

fn local_update(events: &[LocalEvent], notice: Option<&str>) -> WidgetUpdate {
    WidgetUpdate::with_patch(
        local_view(events, notice),
        StatePatch::LocalCalendar(events.to_vec()),
    )
}

/// Upcoming remote events, dates shown in `tz`.
pub fn remote_view<Tz>(events: &[CalendarEvent], tz: &Tz) -> WidgetView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut view = WidgetView::new(TITLE);
    if events.is_empty() {
        view.push(ViewRow::text("No upcoming events on the calendar."));
        return view;
    }
    for event in events {
        let date = event.start.date_in(tz);
        let time = match event.start {
            EventStart::AllDay(_) => "All day".to_string(),
            EventStart::At(at) => at.with_timezone(tz).format("%H:%M").to_string(),
        };
        view.push(ViewRow::from_line(Line::from(vec![
            Span::styled(format!("{:<10}", date.format("%m/%d %a").to_string()), strong_style()),
            Span::styled(format!("{time:<8}"), dim_style()),
            Span::raw(event.summary.clone()),
        ])));
    }
    view
}

/// Today's local events with edit affordances.
pub fn local_view(events: &[LocalEvent], notice: Option<&str>) -> WidgetView {
    let mut view = WidgetView::new(TITLE).with_input(InputKind::AddEvent);
    if let Some(notice) = notice {
        view.push(ViewRow::styled(notice, Style::default().fg(Color::Yellow)));
    }
    if events.is_empty() {
        view.push(ViewRow::styled("Nothing planned for today.", dim_style()));
    }
    for event in events {
        view.push(ViewRow::text(format!("• {}", event.text)).with_key(RowKey::LocalEvent(event.id)));
    }
    view
}

/// Whether `view` is a local fallback shown after a failed sync.
pub fn shows_sync_failure(view: &WidgetView) -> bool {
    view.rows
        .first()
        .is_some_and(|row| row.plain_text() == SYNC_FAILED)
}
