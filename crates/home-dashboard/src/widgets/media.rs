//! Media player panel.
//!
//! Playback happens in the system player; the panel shows what was chosen
//! and whether it is audio or video.

use std::path::Path;

use futures::future::{BoxFuture, FutureExt};

use super::photo::{file_row, inspect};
use super::view::dim_style;
use super::{
    InputKind, RefreshContext, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate, WidgetView,
};
use crate::config::Config;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "oga", "flac", "m4a", "aac", "opus"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "webm", "mkv", "mov", "avi", "ogv"];

/// Broad kind of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Sound only.
    Audio,
    /// Moving pictures.
    Video,
    /// Extension not recognized.
    Other,
}

impl MediaKind {
    /// Classifies `path` by its extension.
    pub fn of(path: &Path) -> Self {
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()) else {
            return MediaKind::Other;
        };
        if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Audio
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            MediaKind::Audio => "♫",
            MediaKind::Video => "▶",
            MediaKind::Other => "•",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaKind::Audio => "Audio",
            MediaKind::Video => "Video",
            MediaKind::Other => "Unrecognized file type",
        }
    }
}

/// Media player widget.
pub struct MediaWidget;

/// Factory used by the descriptor table.
pub fn create(_config: &Config) -> Box<dyn Widget> {
    Box::new(MediaWidget)
}

impl Widget for MediaWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Media
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        async move {
            let mut view = WidgetView::new("Media player").with_input(InputKind::ChooseMedia);
            match &ctx.media {
                None => view.push(ViewRow::styled(
                    "No file chosen. Press a to pick an audio or video file.",
                    dim_style(),
                )),
                Some(path) => {
                    let summary = inspect(path).await?;
                    let kind = MediaKind::of(path);
                    view.push(file_row(kind.glyph(), &summary));
                    view.push(ViewRow::styled(
                        format!("{} · press Enter to play", kind.label()),
                        dim_style(),
                    ));
                }
            }
            Ok(WidgetUpdate::view(view))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::client_at;

    #[test]
    fn classifies_by_extension_case_insensitively() {
        assert_eq!(MediaKind::of(Path::new("song.MP3")), MediaKind::Audio);
        assert_eq!(MediaKind::of(Path::new("/a/b/clip.webm")), MediaKind::Video);
        assert_eq!(MediaKind::of(Path::new("notes.txt")), MediaKind::Other);
        assert_eq!(MediaKind::of(Path::new("README")), MediaKind::Other);
    }

    #[tokio::test]
    async fn chosen_video_is_labelled() {
        let tmp = tempfile::tempdir().expect("failed to create temp dir");
        let path = tmp.path().join("trip.mp4");
        std::fs::write(&path, b"0123456789").expect("write media");

        let mut ctx = RefreshContext::new(client_at("http://127.0.0.1:9"));
        ctx.media = Some(path);
        let update = MediaWidget.refresh(&ctx).await.expect("refresh succeeds");
        assert_eq!(
            update.view.to_plain_lines(),
            vec![
                "▶ trip.mp4  10 B".to_string(),
                "Video · press Enter to play".to_string(),
            ]
        );
    }
}
