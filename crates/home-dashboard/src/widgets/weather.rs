//! Current weather panel.
//!
//! The location comes from configuration. `"auto"` asks the geolocation
//! service first and falls back to a fixed place when the lookup fails or
//! runs past its time limit.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use home_feeds::{FeedClient, WeatherReport};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::view::{dim_style, strong_style};
use super::{RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView};
use crate::config::Config;
use crate::state::{StatePatch, WeatherSummary};

/// Where to ask for weather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    /// Look up by IP, falling back to the given place.
    Auto {
        /// Used when the lookup fails.
        fallback: String,
        /// Upper bound on the lookup.
        limit: Duration,
    },
    /// Fixed city name or `lat,lon`.
    Fixed(String),
}

/// Widget showing current conditions.
pub struct WeatherWidget {
    source: LocationSource,
}

impl WeatherWidget {
    /// Creates a widget for `source`.
    pub fn new(source: LocationSource) -> Self {
        Self { source }
    }

    async fn resolve_location(&self, client: &FeedClient) -> String {
        match &self.source {
            LocationSource::Fixed(location) => location.clone(),
            LocationSource::Auto { fallback, limit } => match client.locate(*limit).await {
                Ok(point) => {
                    tracing::debug!(city = point.city.as_deref().unwrap_or(""), "located by IP");
                    point.to_query()
                }
                Err(e) => {
                    tracing::info!(error = %e, fallback = %fallback, "location lookup failed, using fallback");
                    fallback.clone()
                }
            },
        }
    }
}

/// Factory used by the descriptor table.
pub fn create(config: &Config) -> Box<dyn Widget> {
    let weather = &config.weather;
    let source = if weather.is_auto() {
        LocationSource::Auto {
            fallback: weather.fallback_location.clone(),
            limit: weather
                .locate_timeout()
                .unwrap_or(Duration::from_secs(10)),
        }
    } else {
        LocationSource::Fixed(weather.location.trim().to_string())
    };
    Box::new(WeatherWidget::new(source))
}

impl Widget for WeatherWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Weather
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let location = self.resolve_location(&ctx.client).await;
            let report = ctx.client.weather(&location).await?;
            let summary = WeatherSummary {
                description: report.description.clone(),
            };
            Ok(WidgetUpdate::with_patch(
                render(&report),
                StatePatch::Weather(summary),
            ))
        }
        .boxed()
    }
}

/// Panel content for a report.
pub fn render(report: &WeatherReport) -> WidgetView {
    let mut view = WidgetView::new("Weather");
    view.push(ViewRow::from_line(Line::from(vec![
        Span::styled(format!("{:.0}°C", report.temperature_c), strong_style()),
        Span::raw("  "),
        Span::styled(report.description.clone(), Style::default()),
    ])));

    let mut details = Vec::new();
    if let Some(feels) = report.feels_like_c {
        details.push(format!("feels like {feels:.0}°C"));
    }
    if let Some(humidity) = report.humidity {
        details.push(format!("humidity {humidity}%"));
    }
    if !details.is_empty() {
        view.push(ViewRow::styled(details.join(" · "), dim_style()));
    }

    let place = match &report.country {
        Some(country) if !report.area.is_empty() => format!("{}, {country}", report.area),
        _ => report.area.clone(),
    };
    if !place.is_empty() {
        view.push(ViewRow::styled(place, dim_style()));
    }
    view
}
