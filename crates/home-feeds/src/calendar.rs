//! Google Calendar API v3 — upcoming events of a single calendar.
//!
//! Uses API-key access, which only works for calendars shared publicly.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::Deserialize;

use crate::client::{with_segments, FeedClient};
use crate::error::FeedError;

/// Upper bound on the number of events requested per call.
pub const DEFAULT_MAX_RESULTS: u32 = 7;

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<String>,
    start: Option<RawEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Key and calendar id needed to query a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCredentials {
    /// API key.
    pub api_key: String,
    /// Calendar identifier (usually an e-mail address).
    pub calendar_id: String,
}

impl CalendarCredentials {
    /// Builds credentials when both parts are non-blank.
    pub fn from_parts(api_key: &str, calendar_id: &str) -> Option<Self> {
        let api_key = api_key.trim();
        let calendar_id = calendar_id.trim();
        if api_key.is_empty() || calendar_id.is_empty() {
            return None;
        }
        Some(Self {
            api_key: api_key.to_string(),
            calendar_id: calendar_id.to_string(),
        })
    }
}

/// When an event starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    /// All-day event on the given date.
    AllDay(NaiveDate),
    /// Timed event.
    At(DateTime<FixedOffset>),
}

impl EventStart {
    /// Calendar date of the start as seen from `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventStart::AllDay(date) => *date,
            EventStart::At(at) => at.with_timezone(tz).date_naive(),
        }
    }

    /// Returns `true` for all-day events.
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventStart::AllDay(_))
    }
}

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Event title.
    pub summary: String,
    /// Start of the event.
    pub start: EventStart,
}

impl FeedClient {
    /// Fetches upcoming events starting from `from`, ordered by start time.
    pub async fn calendar_events(
        &self,
        credentials: &CalendarCredentials,
        from: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CalendarEvent>, FeedError> {
        let mut url = with_segments(
            &self.endpoints().calendar,
            &["calendars", &credentials.calendar_id, "events"],
        )?;
        url.query_pairs_mut()
            .append_pair("key", &credentials.api_key)
            .append_pair("timeMin", &from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("maxResults", &max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");
        let body = self.get_text(url).await?;
        parse_events(&body)
    }
}

/// Parses an events-list body, dropping cancelled and undated entries.
pub fn parse_events(body: &str) -> Result<Vec<CalendarEvent>, FeedError> {
    let raw: EventsResponse = serde_json::from_str(body)?;
    let mut events = Vec::with_capacity(raw.items.len());
    for item in raw.items {
        if item.status.as_deref() == Some("cancelled") {
            continue;
        }
        let Some(start) = item.start.and_then(parse_start) else {
            tracing::debug!(summary = ?item.summary, "skipping event without usable start");
            continue;
        };
        events.push(CalendarEvent {
            summary: item
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "(no title)".to_string()),
            start,
        });
    }
    Ok(events)
}

fn parse_start(raw: RawEventTime) -> Option<EventStart> {
    if let Some(date_time) = raw.date_time {
        return DateTime::parse_from_rfc3339(&date_time)
            .ok()
            .map(EventStart::At);
    }
    raw.date
        .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
        .map(EventStart::AllDay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoints;
    use crate::testing::serve_once;
    use std::time::Duration;

    const SAMPLE: &str = r#"{
        "kind": "calendar#events",
        "items": [
            {"summary": "Dentist", "start": {"dateTime": "2026-10-19T09:30:00+09:00"}},
            {"summary": "Holiday", "start": {"date": "2026-10-20"}},
            {"summary": "Dropped", "status": "cancelled", "start": {"date": "2026-10-21"}},
            {"summary": "No start"},
            {"start": {"date": "2026-10-22"}}
        ]
    }"#;

    #[test]
    fn parses_timed_and_all_day_events() {
        let events = parse_events(SAMPLE).expect("sample parses");
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].summary, "Dentist");
        assert!(!events[0].start.is_all_day());
        assert_eq!(
            events[1].start,
            EventStart::AllDay(NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date"))
        );
        assert_eq!(events[2].summary, "(no title)");
    }

    #[test]
    fn date_in_converts_timed_events() {
        let start = EventStart::At(
            DateTime::parse_from_rfc3339("2026-10-19T23:30:00-05:00").expect("valid"),
        );
        // 23:30 at -05:00 is already the next day in UTC.
        assert_eq!(
            start.date_in(&Utc),
            NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date")
        );
    }

    #[test]
    fn empty_items_is_empty_list() {
        let events = parse_events(r#"{"items": []}"#).expect("parses");
        assert!(events.is_empty());
        let events = parse_events("{}").expect("parses");
        assert!(events.is_empty());
    }

    #[test]
    fn credentials_require_both_parts() {
        assert!(CalendarCredentials::from_parts("key", "cal@example.com").is_some());
        assert!(CalendarCredentials::from_parts("", "cal@example.com").is_none());
        assert!(CalendarCredentials::from_parts("key", "   ").is_none());
        let creds = CalendarCredentials::from_parts(" key ", " id ").expect("present");
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.calendar_id, "id");
    }

    #[tokio::test]
    async fn calendar_query_is_time_bounded_ordered_and_capped() {
        let (base, request) = serve_once(200, SAMPLE).await;
        let client = FeedClient::new(Endpoints::all_at(&base), Duration::from_secs(5))
            .expect("client builds");
        let creds = CalendarCredentials::from_parts("k3y", "family@example.com").expect("creds");
        let from = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();

        let events = client
            .calendar_events(&creds, from, DEFAULT_MAX_RESULTS)
            .await
            .expect("fetch succeeds");
        assert_eq!(events.len(), 3);

        let head = request.await.expect("stub finished");
        let line = head.lines().next().unwrap_or_default();
        assert!(line.starts_with("GET /calendars/family@example.com/events?"), "{line}");
        assert!(line.contains("key=k3y"), "{line}");
        assert!(line.contains("timeMin=2026-10-19T00%3A00%3A00Z"), "{line}");
        assert!(line.contains("maxResults=7"), "{line}");
        assert!(line.contains("singleEvents=true"), "{line}");
        assert!(line.contains("orderBy=startTime"), "{line}");
    }

    #[tokio::test]
    async fn calendar_error_status_propagates() {
        let (base, _request) = serve_once(403, r#"{"error": {"code": 403}}"#).await;
        let client = FeedClient::new(Endpoints::all_at(&base), Duration::from_secs(5))
            .expect("client builds");
        let creds = CalendarCredentials::from_parts("bad", "cal").expect("creds");
        let err = client
            .calendar_events(&creds, Utc::now(), 7)
            .await
            .expect_err("should fail");
        assert!(matches!(err, FeedError::Status(403)));
    }
}
