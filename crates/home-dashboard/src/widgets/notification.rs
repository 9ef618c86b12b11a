//! Mail and chat shortcuts.

use futures::future::{self, BoxFuture, FutureExt};
use ratatui::style::{Color, Modifier, Style};

use super::view::dim_style;
use super::{RefreshContext, ViewRow, ViewTab, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView};
use crate::config::Config;

/// Unread inbox in the Gmail web client.
pub const GMAIL_UNREAD_URL: &str = "https://mail.google.com/mail/u/0/#inbox?q=is:unread";

/// Static tabbed panel; nothing is fetched.
pub struct NotificationWidget;

/// Factory used by the descriptor table.
pub fn create(_config: &Config) -> Box<dyn Widget> {
    Box::new(NotificationWidget)
}

impl Widget for NotificationWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Notification
    }

    fn refresh<'a>(
        &'a self,
        _ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        future::ready(Ok(WidgetUpdate::view(render()))).boxed()
    }
}

/// Gmail, LINE and Discord tabs.
pub fn render() -> WidgetView {
    let mut view = WidgetView::new("Notifications");
    view.tabs = vec![
        ViewTab {
            title: "Gmail".to_string(),
            rows: vec![
                ViewRow::styled(
                    "Check unread mail",
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )
                .with_link(GMAIL_UNREAD_URL),
                ViewRow::styled("Opens the unread inbox in Gmail.", dim_style()),
            ],
        },
        ViewTab {
            title: "LINE".to_string(),
            rows: vec![ViewRow::styled("LINE integration is not supported yet.", dim_style())],
        },
        ViewTab {
            title: "Discord".to_string(),
            rows: vec![ViewRow::styled(
                "Discord integration is not supported yet.",
                dim_style(),
            )],
        },
    ];
    view
}
