//! RSS feeds read through an RSS-to-JSON converter (rss2json API shape).

use serde::Deserialize;

use crate::client::{parse_base, FeedClient};
use crate::error::FeedError;

#[derive(Debug, Deserialize)]
struct ConverterResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<FeedItem>,
}

/// A single entry of a converted feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    /// Entry headline.
    #[serde(default)]
    pub title: String,
    /// Link to the full entry.
    #[serde(default)]
    pub link: String,
    /// Entry body or summary (may contain markup).
    #[serde(default)]
    pub description: String,
    /// Publication timestamp as reported by the converter.
    #[serde(rename = "pubDate", default)]
    pub pub_date: Option<String>,
}

impl FeedClient {
    /// Fetches and converts the RSS feed at `feed_url`.
    ///
    /// An empty item list is returned as-is; callers decide whether that
    /// counts as a failure.
    pub async fn rss_items(&self, feed_url: &str) -> Result<Vec<FeedItem>, FeedError> {
        let mut url = parse_base(&self.endpoints().rss_converter)?;
        url.query_pairs_mut().append_pair("rss_url", feed_url);
        let body = self.get_text(url).await?;
        parse_converted(&body)
    }
}

/// Parses a converter response body.
pub fn parse_converted(body: &str) -> Result<Vec<FeedItem>, FeedError> {
    let raw: ConverterResponse = serde_json::from_str(body)?;
    if !raw.status.is_empty() && raw.status != "ok" {
        return Err(FeedError::Decode(format!(
            "converter status {:?}: {}",
            raw.status,
            raw.message.unwrap_or_default()
        )));
    }
    Ok(raw.items)
}

/// Column width handed to the HTML renderer, wide enough that it never wraps
/// a notice.
const RENDER_WIDTH: usize = 10_000;

/// Reduces an HTML fragment to plain text for terminal display.
///
/// Markup is rendered without decorations and whitespace is collapsed to
/// single spaces. A fragment the renderer rejects is shown as-is.
pub fn strip_markup(html: &str) -> String {
    let rendered = html2text::config::plain_no_decorate()
        .string_from_read(html.as_bytes(), RENDER_WIDTH);
    let text = match rendered {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "feed markup not rendered");
            html.to_string()
        }
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
