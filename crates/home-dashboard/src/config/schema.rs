//! TOML configuration schema types for the home dashboard.
//!
//! All structs derive `Deserialize` and `Serialize` with defaults via
//! `#[serde(default)]`, so a partial file only overrides what it names.
//!
//! Duration fields use human-readable strings (e.g. `"15m"`, `"1s"`, `"10s"`)
//! parsed by the `humantime` crate through the typed accessors below.

use std::path::PathBuf;
use std::time::Duration;

use home_feeds::client::{
    DEFAULT_CALENDAR_URL, DEFAULT_GEOLOCATION_URL, DEFAULT_RSS_CONVERTER_URL, DEFAULT_WEATHER_URL,
};
use home_feeds::Endpoints;
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::xdg;

/// Default national news feed.
pub const DEFAULT_NEWS_FEED: &str = "https://www.nhk.or.jp/rss/news/cat0.xml";

/// Default transit operator feed.
pub const DEFAULT_TRANSIT_FEED: &str = "https://traininfo.jreast.co.jp/train_info/rss/tohoku.xml";

/// Default transit operator status page.
pub const DEFAULT_TRANSIT_STATUS_PAGE: &str =
    "https://traininfo.jreast.co.jp/train_info/tohoku.aspx";

/// Title marker of transit items that report normal service.
pub const DEFAULT_NORMAL_MARKER: &str = "平常運転";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration encompassing all sections.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Timers.
    pub dashboard: DashboardConfig,
    /// Weather location resolution.
    pub weather: WeatherConfig,
    /// News feed.
    pub news: NewsConfig,
    /// Transit status feed.
    pub transit: TransitConfig,
    /// Remote calendar query.
    pub calendar: CalendarConfig,
    /// Photo frame.
    pub photo: PhotoConfig,
    /// Remote service base URLs.
    pub endpoints: EndpointsConfig,
    /// Preference store location.
    pub storage: StorageConfig,
    /// Log verbosity and destination.
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks every value that is only validated on use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dashboard.refresh_interval()?;
        self.dashboard.clock_interval()?;
        self.weather.locate_timeout()?;
        self.endpoints.request_timeout()?;
        if self.news.max_items == 0 {
            return Err(ConfigError::InvalidValue {
                field: "news.max_items",
                message: "must be at least 1".to_string(),
            });
        }
        if self.calendar.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calendar.max_results",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value).map_err(|e| ConfigError::InvalidValue {
        field,
        message: format!("{value:?}: {e}"),
    })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Refresh and clock timers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Interval between refresh cycles (e.g. `"15m"`).
    pub refresh_interval: String,
    /// Interval between clock redraws (e.g. `"1s"`).
    pub clock_interval: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: "15m".to_string(),
            clock_interval: "1s".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Parsed refresh interval.
    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration("dashboard.refresh_interval", &self.refresh_interval)
    }

    /// Parsed clock interval.
    pub fn clock_interval(&self) -> Result<Duration, ConfigError> {
        parse_duration("dashboard.clock_interval", &self.clock_interval)
    }
}

// ---------------------------------------------------------------------------
// Widgets
// ---------------------------------------------------------------------------

/// How the weather widget picks its location.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WeatherConfig {
    /// `"auto"` for an IP lookup, otherwise a city name or `lat,lon`.
    pub location: String,
    /// Used when the automatic lookup fails or times out.
    pub fallback_location: String,
    /// Upper bound on the automatic lookup.
    pub locate_timeout: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            location: "auto".to_string(),
            fallback_location: "Sakata".to_string(),
            locate_timeout: "10s".to_string(),
        }
    }
}

impl WeatherConfig {
    /// Parsed lookup timeout.
    pub fn locate_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("weather.locate_timeout", &self.locate_timeout)
    }

    /// Returns `true` when the location should be looked up by IP.
    pub fn is_auto(&self) -> bool {
        self.location.trim().eq_ignore_ascii_case("auto") || self.location.trim().is_empty()
    }
}

/// News feed settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NewsConfig {
    /// RSS feed URL handed to the converter.
    pub feed_url: String,
    /// Number of headlines shown.
    pub max_items: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_NEWS_FEED.to_string(),
            max_items: 10,
        }
    }
}

/// Transit status feed settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransitConfig {
    /// RSS feed URL handed to the converter.
    pub feed_url: String,
    /// Items whose title contains this marker are dropped.
    pub normal_marker: String,
    /// Operator page linked when the feed cannot be read.
    pub status_page: String,
    /// Region name shown in the panel title.
    pub area_name: String,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_TRANSIT_FEED.to_string(),
            normal_marker: DEFAULT_NORMAL_MARKER.to_string(),
            status_page: DEFAULT_TRANSIT_STATUS_PAGE.to_string(),
            area_name: "Tohoku".to_string(),
        }
    }
}

/// Remote calendar query settings. Credentials live in the preference store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CalendarConfig {
    /// Upper bound on returned events.
    pub max_results: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_results: home_feeds::calendar::DEFAULT_MAX_RESULTS,
        }
    }
}

/// Photo frame settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PhotoConfig {
    /// Initial photo path. Empty means none until one is chosen.
    pub path: String,
}

impl PhotoConfig {
    /// Expanded path, if configured.
    pub fn path(&self) -> Option<PathBuf> {
        let trimmed = self.path.trim();
        (!trimmed.is_empty()).then(|| xdg::expand_tilde(trimmed))
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Base URLs of the remote services.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Weather-by-location service.
    pub weather: String,
    /// RSS-to-JSON converter.
    pub rss_converter: String,
    /// Calendar API base.
    pub calendar: String,
    /// IP geolocation lookup.
    pub geolocation: String,
    /// Per-request timeout.
    pub request_timeout: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_URL.to_string(),
            rss_converter: DEFAULT_RSS_CONVERTER_URL.to_string(),
            calendar: DEFAULT_CALENDAR_URL.to_string(),
            geolocation: DEFAULT_GEOLOCATION_URL.to_string(),
            request_timeout: "20s".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// Parsed per-request timeout.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration("endpoints.request_timeout", &self.request_timeout)
    }

    /// Converts into the feed client's endpoint set.
    pub fn to_endpoints(&self) -> Endpoints {
        Endpoints {
            weather: self.weather.clone(),
            rss_converter: self.rss_converter.clone(),
            calendar: self.calendar.clone(),
            geolocation: self.geolocation.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Storage & logging
// ---------------------------------------------------------------------------

/// Preference store location.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON store. Empty means the XDG data directory.
    pub path: String,
}

impl StorageConfig {
    /// Resolved store path.
    pub fn path(&self) -> PathBuf {
        let trimmed = self.path.trim();
        if trimmed.is_empty() {
            xdg::store_path()
        } else {
            xdg::expand_tilde(trimmed)
        }
    }
}

/// Log settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Verbosity when `HOMEDASH_LOG` is unset.
    pub level: LogLevel,
    /// Log file used by the TUI. Empty means the XDG state directory.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: String::new(),
        }
    }
}

impl LoggingConfig {
    /// Resolved TUI log file.
    pub fn file(&self) -> PathBuf {
        let trimmed = self.file.trim();
        if trimmed.is_empty() {
            xdg::log_path()
        } else {
            xdg::expand_tilde(trimmed)
        }
    }
}

/// Log verbosity levels (kebab-case in TOML).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    Warn,
    /// Informational messages (default).
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[dashboard]
refresh_interval = "5m"
clock_interval = "2s"

[weather]
location = "Tokyo"
fallback_location = "Osaka"
locate_timeout = "3s"

[news]
feed_url = "https://example.com/news.xml"
max_items = 5

[transit]
normal_marker = "Good service"
area_name = "Kanto"

[calendar]
max_results = 3

[photo]
path = "/srv/photos/cat.jpg"

[endpoints]
weather = "http://127.0.0.1:9000"
request_timeout = "5s"

[storage]
path = "/srv/home/prefs.json"

[logging]
level = "debug"
file = "/var/log/homedash.log"
"#;
        let config: Config = toml::from_str(toml_str).expect("valid TOML should parse");
        assert_eq!(
            config.dashboard.refresh_interval().expect("parses"),
            Duration::from_secs(300)
        );
        assert_eq!(config.weather.location, "Tokyo");
        assert!(!config.weather.is_auto());
        assert_eq!(config.news.max_items, 5);
        assert_eq!(config.transit.normal_marker, "Good service");
        assert_eq!(config.transit.feed_url, DEFAULT_TRANSIT_FEED);
        assert_eq!(config.calendar.max_results, 3);
        assert_eq!(
            config.photo.path(),
            Some(PathBuf::from("/srv/photos/cat.jpg"))
        );
        assert_eq!(config.endpoints.weather, "http://127.0.0.1:9000");
        assert_eq!(config.endpoints.rss_converter, DEFAULT_RSS_CONVERTER_URL);
        assert_eq!(config.storage.path(), PathBuf::from("/srv/home/prefs.json"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file(), PathBuf::from("/var/log/homedash.log"));
    }

    #[test]
    fn parse_empty_string_uses_all_defaults() {
        let config: Config = toml::from_str("").expect("empty string should parse");
        assert_eq!(config, Config::default());
        assert!(config.weather.is_auto());
        assert_eq!(config.photo.path(), None);
    }

    #[test]
    fn parse_unknown_fields_are_ignored() {
        let config: Config = toml::from_str("[dashboard]\nfuture_option = true\n")
            .expect("unknown fields should be ignored");
        assert_eq!(config.dashboard, DashboardConfig::default());
    }

    #[test]
    fn default_durations_parse() {
        let config = Config::default();
        assert_eq!(
            config.dashboard.refresh_interval().expect("parses"),
            Duration::from_secs(15 * 60)
        );
        assert_eq!(
            config.dashboard.clock_interval().expect("parses"),
            Duration::from_secs(1)
        );
        assert_eq!(
            config.weather.locate_timeout().expect("parses"),
            Duration::from_secs(10)
        );
        assert_eq!(
            config.endpoints.request_timeout().expect("parses"),
            Duration::from_secs(20)
        );
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn bad_duration_names_the_field() {
        let mut config = Config::default();
        config.dashboard.refresh_interval = "soon".to_string();
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "dashboard.refresh_interval")
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut config = Config::default();
        config.dashboard.clock_interval = "0s".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_news_items_is_rejected() {
        let mut config = Config::default();
        config.news.max_items = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "news.max_items", .. })
        ));
    }

    #[test]
    fn log_levels_parse_kebab_case() {
        for (input, expected) in [
            ("error", LogLevel::Error),
            ("warn", LogLevel::Warn),
            ("info", LogLevel::Info),
            ("debug", LogLevel::Debug),
            ("trace", LogLevel::Trace),
        ] {
            let toml_str = format!("level = \"{input}\"");
            let logging: LoggingConfig = toml::from_str(&toml_str).expect("level should parse");
            assert_eq!(logging.level, expected);
            assert_eq!(logging.level.as_directive(), input);
        }
    }

    #[test]
    fn endpoints_convert_to_feed_endpoints() {
        let endpoints = EndpointsConfig::default().to_endpoints();
        assert_eq!(endpoints, Endpoints::default());
    }
}
