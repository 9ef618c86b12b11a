//! Shared HTTP client for every remote feed.
//!
//! One [`FeedClient`] is built per process and cloned into each refresh
//! cycle. Cloning is cheap: `reqwest::Client` is reference-counted.

use std::time::Duration;

use reqwest::Url;

use crate::error::FeedError;

/// Default weather endpoint (wttr.in JSON format `j1`).
pub const DEFAULT_WEATHER_URL: &str = "https://wttr.in";

/// Default RSS-to-JSON conversion endpoint.
pub const DEFAULT_RSS_CONVERTER_URL: &str = "https://api.rss2json.com/v1/api.json";

/// Default Google Calendar API v3 base.
pub const DEFAULT_CALENDAR_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Default IP geolocation endpoint.
pub const DEFAULT_GEOLOCATION_URL: &str = "https://ipinfo.io/json";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = concat!("home-dashboard/", env!("CARGO_PKG_VERSION"));

/// Base URLs of the third-party services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Weather-by-location service.
    pub weather: String,
    /// RSS-to-JSON converter used by the news and transit widgets.
    pub rss_converter: String,
    /// Calendar API base (events are under `/calendars/{id}/events`).
    pub calendar: String,
    /// IP geolocation lookup.
    pub geolocation: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_URL.to_string(),
            rss_converter: DEFAULT_RSS_CONVERTER_URL.to_string(),
            calendar: DEFAULT_CALENDAR_URL.to_string(),
            geolocation: DEFAULT_GEOLOCATION_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at the same base URL.
    ///
    /// Handy for routing all traffic to a local stub.
    pub fn all_at(base: &str) -> Self {
        Self {
            weather: base.to_string(),
            rss_converter: base.to_string(),
            calendar: base.to_string(),
            geolocation: base.to_string(),
        }
    }
}

/// Async HTTP client for the dashboard's data sources.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    timeout: Duration,
}

impl FeedClient {
    /// Builds a client with the given endpoints and per-request timeout.
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoints,
            timeout,
        })
    }

    /// Builds a client against the public endpoints.
    pub fn with_defaults() -> Result<Self, FeedError> {
        Self::new(Endpoints::default(), DEFAULT_REQUEST_TIMEOUT)
    }

    /// Configured endpoints.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs a GET and returns the body of a successful response.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, FeedError> {
        tracing::debug!(host = url.host_str().unwrap_or(""), path = url.path(), "feed request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        map_status(response.status().as_u16())?;

        response.text().await.map_err(|e| self.map_send_error(e))
    }

    fn map_send_error(&self, e: reqwest::Error) -> FeedError {
        if e.is_timeout() {
            FeedError::Timeout(self.timeout)
        } else {
            FeedError::from(e)
        }
    }
}

/// Parses a configured base URL.
pub(crate) fn parse_base(base: &str) -> Result<Url, FeedError> {
    Url::parse(base).map_err(|e| FeedError::InvalidUrl(format!("{base}: {e}")))
}

/// Appends path segments to a base URL, percent-encoding each one.
pub(crate) fn with_segments(base: &str, segments: &[&str]) -> Result<Url, FeedError> {
    let mut url = parse_base(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| FeedError::InvalidUrl(base.to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Map an HTTP status code to a result.
fn map_status(status: u16) -> Result<(), FeedError> {
    match status {
        200..=299 => Ok(()),
        _ => Err(FeedError::Status(status)),
    }
}
