//! News headlines panel.

use futures::future::{BoxFuture, FutureExt};
use home_feeds::{FeedError, FeedItem};

use super::{RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView};
use crate::config::Config;

/// Widget listing the latest headlines of one RSS feed.
pub struct NewsWidget {
    feed_url: String,
    max_items: usize,
}

impl NewsWidget {
    /// Creates a widget for `feed_url` showing at most `max_items` rows.
    pub fn new(feed_url: impl Into<String>, max_items: usize) -> Self {
        Self {
            feed_url: feed_url.into(),
            max_items,
        }
    }
}

/// Factory used by the descriptor table.
pub fn create(config: &Config) -> Box<dyn Widget> {
    Box::new(NewsWidget::new(
        config.news.feed_url.clone(),
        config.news.max_items,
    ))
}

impl Widget for NewsWidget {
    fn id(&self) -> WidgetId {
        WidgetId::News
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let items = ctx.client.rss_items(&self.feed_url).await?;
            if items.is_empty() {
                return Err(FeedError::Empty("news items").into());
            }
            Ok(WidgetUpdate::view(render(&items, self.max_items)))
        }
        .boxed()
    }
}

/// One linked row per headline, up to `max_items`.
pub fn render(items: &[FeedItem], max_items: usize) -> WidgetView {
    let mut view = WidgetView::new("News");
    for item in items.iter().take(max_items) {
        let mut row = ViewRow::text(item.title.trim());
        if !item.link.is_empty() {
            row = row.with_link(item.link.clone());
        }
        view.push(row);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{client_at, serve_once};

    fn item(n: usize) -> FeedItem {
        FeedItem {
            title: format!("Headline {n}"),
            link: format!("https://news.example/{n}"),
            description: String::new(),
            pub_date: None,
        }
    }

    #[test]
    fn render_caps_rows_and_keeps_links() {
        let items: Vec<_> = (0..15).map(item).collect();
        let view = render(&items, 10);
        assert_eq!(view.rows.len(), 10);
        assert_eq!(view.rows[0].plain_text(), "Headline 0");
        assert_eq!(view.rows[9].link.as_deref(), Some("https://news.example/9"));
    }

    #[tokio::test]
    async fn empty_feed_is_a_failure() {
        let (base, _request) = serve_once(200, r#"{"status": "ok", "items": []}"#).await;
        let ctx = RefreshContext::new(client_at(&base));
        let widget = NewsWidget::new("https://feed.example/rss.xml", 10);
        let err = widget.refresh(&ctx).await.expect_err("empty list should fail");
        assert!(
            matches!(err, WidgetError::Feed(FeedError::Empty(_))),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn refresh_requests_converter_with_feed_url() {
        let (base, request) = serve_once(
            200,
            r#"{"status": "ok", "items": [{"title": "Quake drill", "link": "https://n.example/1"}]}"#,
        )
        .await;
        let ctx = RefreshContext::new(client_at(&base));
        let widget = NewsWidget::new("https://feed.example/rss.xml", 10);
        let update = widget.refresh(&ctx).await.expect("refresh succeeds");
        assert_eq!(update.view.to_plain_lines(), vec!["Quake drill".to_string()]);

        let head = request.await.expect("stub task");
        assert!(
            head.contains("rss_url=https%3A%2F%2Ffeed.example%2Frss.xml"),
            "got {head}"
        );
    }
}
