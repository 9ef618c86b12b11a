//! Renderable panel content produced by a widget refresh.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Identifies the stored item behind a row, for edit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKey {
    /// Index into the task list.
    Task(usize),
    /// Id of a local event.
    LocalEvent(i64),
}

/// What the panel's add action asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Text of a new task.
    AddTask,
    /// Text of a new local event.
    AddEvent,
    /// Path to an image file.
    ChoosePhoto,
    /// Path to an audio or video file.
    ChooseMedia,
}

impl InputKind {
    /// Prompt shown in the input dialog.
    pub fn prompt(self) -> &'static str {
        match self {
            InputKind::AddTask => "New task",
            InputKind::AddEvent => "New event for today",
            InputKind::ChoosePhoto => "Photo file path",
            InputKind::ChooseMedia => "Audio or video file path",
        }
    }
}

/// One line of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    /// Styled content.
    pub line: Line<'static>,
    /// URL or file path opened by the open action.
    pub link: Option<String>,
    /// Stored item the row stands for.
    pub key: Option<RowKey>,
}

impl ViewRow {
    /// Unstyled text row.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_line(Line::raw(text.into()))
    }

    /// Text row in a single style.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::from_line(Line::from(Span::styled(text.into(), style)))
    }

    /// Row from prepared spans.
    pub fn from_line(line: Line<'static>) -> Self {
        Self {
            line,
            link: None,
            key: None,
        }
    }

    /// Attaches a link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Attaches a row key.
    pub fn with_key(mut self, key: RowKey) -> Self {
        self.key = Some(key);
        self
    }

    /// The row's text without styling.
    pub fn plain_text(&self) -> String {
        self.line
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }
}

/// A named group of rows within a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTab {
    /// Tab label.
    pub title: String,
    /// Rows shown while the tab is selected.
    pub rows: Vec<ViewRow>,
}

/// Everything a panel shows after a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    /// Panel title.
    pub title: String,
    /// Rows, used when there are no tabs.
    pub rows: Vec<ViewRow>,
    /// Tabbed content; takes precedence over `rows` when non-empty.
    pub tabs: Vec<ViewTab>,
    /// Add action offered by the panel.
    pub input: Option<InputKind>,
    /// Set when the view reports a failed refresh.
    pub failed: bool,
}

impl WidgetView {
    /// Empty view with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            tabs: Vec::new(),
            input: None,
            failed: false,
        }
    }

    /// Inline failure view.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        let mut view = Self::new(title);
        view.rows.push(ViewRow::styled(message, error_style()));
        view.failed = true;
        view
    }

    /// Appends a row.
    pub fn push(&mut self, row: ViewRow) {
        self.rows.push(row);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_row(mut self, row: ViewRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Sets the add action.
    pub fn with_input(mut self, input: InputKind) -> Self {
        self.input = Some(input);
        self
    }

    /// Rows visible with tab `tab` selected.
    pub fn visible_rows(&self, tab: usize) -> &[ViewRow] {
        if self.tabs.is_empty() {
            &self.rows
        } else {
            let index = tab.min(self.tabs.len() - 1);
            &self.tabs[index].rows
        }
    }

    /// Plain-text rendering, one line per row, tabs expanded in order.
    pub fn to_plain_lines(&self) -> Vec<String> {
        if self.tabs.is_empty() {
            return self.rows.iter().map(ViewRow::plain_text).collect();
        }
        let mut lines = Vec::new();
        for tab in &self.tabs {
            lines.push(format!("[{}]", tab.title));
            lines.extend(tab.rows.iter().map(|row| format!("  {}", row.plain_text())));
        }
        lines
    }
}

/// Style of failure messages.
pub fn error_style() -> Style {
    Style::default().fg(Color::Red)
}

/// Style of secondary text.
pub fn dim_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style of headline text.
pub fn strong_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_joins_spans() {
        let row = ViewRow::from_line(Line::from(vec![
            Span::styled("12°C", strong_style()),
            Span::raw("  Sunny"),
        ]));
        assert_eq!(row.plain_text(), "12°C  Sunny");
    }

    #[test]
    fn visible_rows_clamps_tab_index() {
        let mut view = WidgetView::new("Notifications");
        view.tabs.push(ViewTab {
            title: "A".to_string(),
            rows: vec![ViewRow::text("a")],
        });
        view.tabs.push(ViewTab {
            title: "B".to_string(),
            rows: vec![ViewRow::text("b")],
        });
        assert_eq!(view.visible_rows(1)[0].plain_text(), "b");
        assert_eq!(view.visible_rows(9)[0].plain_text(), "b");
    }

    #[test]
    fn error_view_is_marked_failed() {
        let view = WidgetView::error("News", "Could not load news");
        assert!(view.failed);
        assert_eq!(view.to_plain_lines(), vec!["Could not load news".to_string()]);
    }

    #[test]
    fn plain_lines_expand_tabs() {
        let mut view = WidgetView::new("Notifications");
        view.tabs.push(ViewTab {
            title: "Gmail".to_string(),
            rows: vec![ViewRow::text("Open unread mail")],
        });
        assert_eq!(
            view.to_plain_lines(),
            vec!["[Gmail]".to_string(), "  Open unread mail".to_string()]
        );
    }
}
