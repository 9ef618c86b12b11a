//! Photo frame panel.
//!
//! The terminal cannot draw the picture itself, so the panel names the
//! chosen file and hands it to the system viewer on open.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use ratatui::text::{Line, Span};

use super::view::{dim_style, strong_style};
use super::{
    InputKind, RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView,
};
use crate::config::Config;

/// Name and size of a chosen file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Full path.
    pub path: PathBuf,
    /// File name for display.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Reads the summary of `path`, failing when it is missing or not a file.
pub async fn inspect(path: &Path) -> Result<FileSummary, WidgetError> {
    let io_error = |source| WidgetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
    if !metadata.is_file() {
        return Err(io_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FileSummary {
        path: path.to_path_buf(),
        name,
        size: metadata.len(),
    })
}

/// Formats a byte count with a binary unit.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Row naming a file, linked to its path.
pub(crate) fn file_row(label: &str, summary: &FileSummary) -> ViewRow {
    ViewRow::from_line(Line::from(vec![
        Span::raw(format!("{label} ")),
        Span::styled(summary.name.clone(), strong_style()),
        Span::styled(format!("  {}", human_size(summary.size)), dim_style()),
    ]))
    .with_link(summary.path.display().to_string())
}

/// Photo frame widget.
pub struct PhotoWidget;

/// Factory used by the descriptor table.
pub fn create(_config: &Config) -> Box<dyn Widget> {
    Box::new(PhotoWidget)
}

impl Widget for PhotoWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Photo
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let mut view = WidgetView::new("Photo frame").with_input(InputKind::ChoosePhoto);
            match &ctx.photo {
                None => view.push(ViewRow::styled(
                    "No photo chosen. Press a to pick one.",
                    dim_style(),
                )),
                Some(path) => {
                    let summary = inspect(path).await?;
                    view.push(file_row("▣", &summary));
                    view.push(ViewRow::styled("Press Enter to view.", dim_style()));
                }
            }
            Ok(WidgetUpdate::view(view))
        }
        .boxed()
    }
}
