//! Aggregated dashboard state.
//!
//! Rebuilt from scratch by every refresh cycle. Widgets never touch it
//! directly; they return a [`StatePatch`] that the renderer applies once all
//! refreshes have settled.

use home_feeds::CalendarEvent;

use crate::LocalEvent;

/// The part of a weather report other components read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSummary {
    /// Condition text, e.g. `"Light rain shower"`.
    pub description: String,
}

/// Data shared between widgets and the greeting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    /// Current conditions, when the weather widget succeeded.
    pub weather: Option<WeatherSummary>,
    /// Upcoming remote events in API order.
    pub calendar: Vec<CalendarEvent>,
    /// Today's locally kept events, when the calendar is in local mode.
    pub local_events: Vec<LocalEvent>,
}

/// A widget's contribution to [`DashboardState`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatePatch {
    /// Nothing to record.
    #[default]
    None,
    /// Current weather conditions.
    Weather(WeatherSummary),
    /// Events from the remote calendar.
    RemoteCalendar(Vec<CalendarEvent>),
    /// Events from the local per-day list.
    LocalCalendar(Vec<LocalEvent>),
}

impl DashboardState {
    /// Records one widget's patch.
    pub fn apply(&mut self, patch: StatePatch) {
        match patch {
            StatePatch::None => {}
            StatePatch::Weather(summary) => self.weather = Some(summary),
            StatePatch::RemoteCalendar(events) => {
                self.calendar = events;
                self.local_events.clear();
            }
            StatePatch::LocalCalendar(events) => {
                self.calendar.clear();
                self.local_events = events;
            }
        }
    }
}
