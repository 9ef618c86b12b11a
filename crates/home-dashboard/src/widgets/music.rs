//! Music placeholder panel.

use futures::future::{self, BoxFuture, FutureExt};

use super::view::dim_style;
use super::{RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView};
use crate::config::Config;

/// Static panel reserved for a music service.
pub struct MusicWidget;

/// Factory used by the descriptor table.
pub fn create(_config: &Config) -> Box<dyn Widget> {
    Box::new(MusicWidget)
}

impl Widget for MusicWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Music
    }

    fn refresh<'a>(
        &'a self,
        _ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        let view = WidgetView::new("Music")
            .with_row(ViewRow::text("♪ Nothing playing"))
            .with_row(ViewRow::styled("No music service is connected.", dim_style()));
        future::ready(Ok(WidgetUpdate::view(view))).boxed()
    }
}
