//! Contextual greeting.
//!
//! [`compose`] is pure: the same state, tasks and clock always give the same
//! greeting. Exactly one message is chosen, in priority order:
//!
//! 1. a rain warning when the weather description mentions precipitation
//! 2. the first thing happening today (remote events, local events, open tasks)
//! 3. a time-of-day salutation

use std::fmt;

use chrono::{DateTime, TimeZone, Timelike};

use crate::state::DashboardState;
use crate::Task;

/// Substrings that mark a rainy forecast, matched case-insensitively.
pub const RAIN_KEYWORDS: &[&str] = &["rain", "drizzle", "shower", "雨"];

/// Part of the day used for the salutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    /// 05:00 to 11:59.
    Morning,
    /// 12:00 to 17:59.
    Afternoon,
    /// 18:00 to 04:59.
    Evening,
}

impl DayPart {
    /// Classifies an hour of the day (0-23).
    pub fn from_hour(hour: u32) -> Self {
        if !(5..18).contains(&hour) {
            DayPart::Evening
        } else if hour < 12 {
            DayPart::Morning
        } else {
            DayPart::Afternoon
        }
    }
}

/// The single message shown in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Greeting {
    /// Rain is forecast.
    RainWarning,
    /// Something is on today's agenda.
    Upcoming(String),
    /// Nothing notable; greet by time of day.
    Salutation(DayPart),
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Greeting::RainWarning => f.write_str("Rain is forecast today. Don't forget an umbrella."),
            Greeting::Upcoming(title) => write!(f, "Today: \u{201c}{title}\u{201d}"),
            Greeting::Salutation(DayPart::Morning) => f.write_str("Good morning"),
            Greeting::Salutation(DayPart::Afternoon) => f.write_str("Good afternoon"),
            Greeting::Salutation(DayPart::Evening) => f.write_str("Good evening"),
        }
    }
}

/// Returns `true` if `description` mentions precipitation.
pub fn is_rainy(description: &str) -> bool {
    let lowered = description.to_lowercase();
    RAIN_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Picks the greeting for `now`.
pub fn compose<Tz: TimeZone>(state: &DashboardState, tasks: &[Task], now: &DateTime<Tz>) -> Greeting {
    if state
        .weather
        .as_ref()
        .is_some_and(|weather| is_rainy(&weather.description))
    {
        return Greeting::RainWarning;
    }

    if let Some(title) = first_of_today(state, tasks, now) {
        return Greeting::Upcoming(title);
    }

    Greeting::Salutation(DayPart::from_hour(now.hour()))
}

fn first_of_today<Tz: TimeZone>(
    state: &DashboardState,
    tasks: &[Task],
    now: &DateTime<Tz>,
) -> Option<String> {
    let tz = now.timezone();
    let today = now.date_naive();

    let remote = state
        .calendar
        .iter()
        .filter(|event| event.start.date_in(&tz) == today)
        .map(|event| event.summary.as_str());
    let local = state.local_events.iter().map(|event| event.text.as_str());
    let open_tasks = tasks
        .iter()
        .filter(|task| !task.completed)
        .map(|task| task.text.as_str());

    remote.chain(local).chain(open_tasks).next().map(str::to_string)
}
