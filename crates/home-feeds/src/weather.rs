//! Current conditions from wttr.in (`?format=j1`).

use serde::Deserialize;

use crate::client::{with_segments, FeedClient};
use crate::error::FeedError;

#[derive(Debug, Deserialize)]
struct WttrResponse {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    nearest_area: Vec<NearestArea>,
}

#[derive(Debug, Deserialize)]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC", default)]
    feels_like_c: Option<String>,
    #[serde(default)]
    humidity: Option<String>,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct NearestArea {
    #[serde(rename = "areaName", default)]
    area_name: Vec<TextValue>,
    #[serde(default)]
    country: Vec<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

/// Current weather at a location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Air temperature in degrees Celsius.
    pub temperature_c: f32,
    /// Apparent temperature in degrees Celsius, if reported.
    pub feels_like_c: Option<f32>,
    /// Relative humidity percentage, if reported.
    pub humidity: Option<u8>,
    /// Human-readable condition, e.g. `"Light rain"`.
    pub description: String,
    /// Nearest named area.
    pub area: String,
    /// Country of the nearest area, if reported.
    pub country: Option<String>,
}

impl FeedClient {
    /// Fetches current conditions for a city name or a `lat,lon` pair.
    pub async fn weather(&self, location: &str) -> Result<WeatherReport, FeedError> {
        let mut url = with_segments(&self.endpoints().weather, &[location])?;
        url.query_pairs_mut().append_pair("format", "j1");
        let body = self.get_text(url).await?;
        parse_weather(&body)
    }
}

/// Parses a wttr.in `j1` body.
pub fn parse_weather(body: &str) -> Result<WeatherReport, FeedError> {
    let raw: WttrResponse = serde_json::from_str(body)?;
    let condition = raw
        .current_condition
        .into_iter()
        .next()
        .ok_or(FeedError::Empty("current conditions"))?;

    let temperature_c = condition
        .temp_c
        .trim()
        .parse::<f32>()
        .map_err(|e| FeedError::Decode(format!("temp_C {:?}: {e}", condition.temp_c)))?;

    let description = condition
        .weather_desc
        .into_iter()
        .next()
        .map(|d| d.value.trim().to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let (area, country) = match raw.nearest_area.into_iter().next() {
        Some(area) => (
            area.area_name
                .into_iter()
                .next()
                .map(|v| v.value)
                .unwrap_or_default(),
            area.country.into_iter().next().map(|v| v.value),
        ),
        None => (String::new(), None),
    };

    Ok(WeatherReport {
        temperature_c,
        feels_like_c: condition
            .feels_like_c
            .and_then(|v| v.trim().parse::<f32>().ok()),
        humidity: condition.humidity.and_then(|v| v.trim().parse::<u8>().ok()),
        description,
        area,
        country,
    })
}
