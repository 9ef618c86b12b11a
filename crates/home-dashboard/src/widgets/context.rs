//! Snapshot of everything a widget refresh may read.
//!
//! [`RefreshContext`] is owned so a refresh cycle can run on its own task
//! while the UI keeps mutating preferences.

use std::path::PathBuf;

use chrono::{DateTime, Local, NaiveDate};
use home_feeds::{CalendarCredentials, FeedClient};

use crate::{LocalEvent, Task};

/// Inputs of one refresh cycle.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    /// Shared HTTP client.
    pub client: FeedClient,
    /// Calendar credentials, when both parts are stored.
    pub credentials: Option<CalendarCredentials>,
    /// Stored tasks.
    pub tasks: Vec<Task>,
    /// Today's local events.
    pub local_events: Vec<LocalEvent>,
    /// Photo chosen for the frame.
    pub photo: Option<PathBuf>,
    /// File chosen for the media player.
    pub media: Option<PathBuf>,
    /// Wall-clock time the cycle started.
    pub now: DateTime<Local>,
}

impl RefreshContext {
    /// Context with no stored data, stamped with the current time.
    pub fn new(client: FeedClient) -> Self {
        Self {
            client,
            credentials: None,
            tasks: Vec::new(),
            local_events: Vec::new(),
            photo: None,
            media: None,
            now: Local::now(),
        }
    }

    /// Local calendar day of the cycle.
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
