//! Approximate position lookup by public IP address.
//!
//! Stands in for a device location prompt: the lookup is bounded by a
//! caller-chosen timeout and callers fall back to a fixed location on any
//! failure.

use std::time::Duration;

use serde::Deserialize;

use crate::client::{parse_base, FeedClient};
use crate::error::FeedError;

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    loc: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

/// A resolved position.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// City name reported by the lookup service, if any.
    pub city: Option<String>,
}

impl GeoPoint {
    /// Formats the point as a `lat,lon` location query.
    pub fn to_query(&self) -> String {
        format!("{:.2},{:.2}", self.latitude, self.longitude)
    }
}

impl FeedClient {
    /// Looks up the caller's approximate position, giving up after `limit`.
    pub async fn locate(&self, limit: Duration) -> Result<GeoPoint, FeedError> {
        let url = parse_base(&self.endpoints().geolocation)?;
        let body = tokio::time::timeout(limit, self.get_text(url))
            .await
            .map_err(|_| FeedError::Timeout(limit))??;
        parse_geolocation(&body)
    }
}

/// Parses an ipinfo-style body (`"loc": "lat,lon"`).
pub fn parse_geolocation(body: &str) -> Result<GeoPoint, FeedError> {
    let raw: IpInfoResponse = serde_json::from_str(body)?;
    let loc = raw.loc.ok_or(FeedError::Empty("location"))?;
    let (lat, lon) = loc
        .split_once(',')
        .ok_or_else(|| FeedError::Decode(format!("malformed loc {loc:?}")))?;
    let latitude = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| FeedError::Decode(format!("latitude {lat:?}: {e}")))?;
    let longitude = lon
        .trim()
        .parse::<f64>()
        .map_err(|e| FeedError::Decode(format!("longitude {lon:?}: {e}")))?;
    Ok(GeoPoint {
        latitude,
        longitude,
        city: raw.city.filter(|c| !c.is_empty()),
    })
}
