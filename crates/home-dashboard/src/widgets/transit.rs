//! Transit service status panel.
//!
//! The operator feed lists every line, including the ones running normally.
//! Those are filtered out by a title marker; whatever remains is a notice.

use futures::future::{BoxFuture, FutureExt};
use home_feeds::rss::strip_markup;
use home_feeds::FeedItem;
use ratatui::style::{Color, Modifier, Style};

use super::view::dim_style;
use super::{RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView};
use crate::config::schema::TransitConfig;
use crate::config::Config;

/// Widget listing delay and suspension notices.
pub struct TransitWidget {
    settings: TransitConfig,
}

impl TransitWidget {
    /// Creates a widget from the transit settings.
    pub fn new(settings: TransitConfig) -> Self {
        Self { settings }
    }

    fn title(&self) -> String {
        if self.settings.area_name.is_empty() {
            "Transit".to_string()
        } else {
            format!("Transit ({})", self.settings.area_name)
        }
    }
}

/// Factory used by the descriptor table.
pub fn create(config: &Config) -> Box<dyn Widget> {
    Box::new(TransitWidget::new(config.transit.clone()))
}

impl Widget for TransitWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Transit
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let items = ctx.client.rss_items(&self.settings.feed_url).await?;
            let notices = notices(&items, &self.settings.normal_marker);
            Ok(WidgetUpdate::view(render(self.title(), &self.settings.area_name, &notices)))
        }
        .boxed()
    }

    fn failure_view(&self, error: &WidgetError) -> WidgetView {
        let mut view = WidgetView::error(
            self.title(),
            format!("Could not load service status: {error}"),
        );
        if !self.settings.status_page.is_empty() {
            view.push(
                ViewRow::styled(
                    "Check the operator's status page",
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .with_link(self.settings.status_page.clone()),
            );
        }
        view
    }
}

/// Items that do not report normal service.
pub fn notices<'a>(items: &'a [FeedItem], normal_marker: &str) -> Vec<&'a FeedItem> {
    items
        .iter()
        .filter(|item| normal_marker.is_empty() || !item.title.contains(normal_marker))
        .collect()
}

fn render(title: String, area: &str, notices: &[&FeedItem]) -> WidgetView {
    let mut view = WidgetView::new(title);
    if notices.is_empty() {
        let message = if area.is_empty() {
            "All lines are running normally.".to_string()
        } else {
            format!("All {area} lines are running normally.")
        };
        view.push(ViewRow::styled(
            message,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
        return view;
    }
    for notice in notices {
        let mut heading = ViewRow::styled(
            notice.title.trim(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        if !notice.link.is_empty() {
            heading = heading.with_link(notice.link.clone());
        }
        view.push(heading);
        let detail = strip_markup(&notice.description);
        if !detail.is_empty() {
            view.push(ViewRow::styled(format!("  {detail}"), dim_style()));
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{client_at, unreachable_base};
    use home_feeds::FeedError;

    fn item(title: &str, description: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: String::new(),
            description: description.to_string(),
            pub_date: None,
        }
    }

    #[test]
    fn normal_service_items_are_dropped() {
        let items = vec![
            item("東北本線 平常運転", ""),
            item("仙山線 運転見合わせ", "<p>倒木の影響</p>"),
        ];
        let kept = notices(&items, "平常運転");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "仙山線 運転見合わせ");
    }

    #[test]
    fn no_notices_shows_all_normal_message() {
        let widget = TransitWidget::new(TransitConfig::default());
        let view = render(widget.title(), "Tohoku", &[]);
        assert_eq!(view.title, "Transit (Tohoku)");
        assert_eq!(
            view.to_plain_lines(),
            vec!["All Tohoku lines are running normally.".to_string()]
        );
    }

    #[test]
    fn notices_render_title_and_plain_description() {
        let items = vec![item("Senzan Line suspended", "<b>Fallen tree</b> near Yamadera")];
        let kept = notices(&items, "平常運転");
        let view = render("Transit".to_string(), "", &kept);
        assert_eq!(
            view.to_plain_lines(),
            vec![
                "Senzan Line suspended".to_string(),
                "  Fallen tree near Yamadera".to_string(),
            ]
        );
    }

    #[test]
    fn failure_view_links_status_page() {
        let widget = TransitWidget::new(TransitConfig::default());
        let view = widget.failure_view(&WidgetError::Feed(FeedError::Status(502)));
        assert!(view.failed);
        assert_eq!(
            view.rows.last().and_then(|row| row.link.as_deref()),
            Some(crate::config::schema::DEFAULT_TRANSIT_STATUS_PAGE)
        );
    }

    #[tokio::test]
    async fn unreachable_converter_is_an_error() {
        let dead = unreachable_base().await;
        let ctx = RefreshContext::new(client_at(&dead));
        let widget = TransitWidget::new(TransitConfig::default());
        assert!(widget.refresh(&ctx).await.is_err());
    }
}
