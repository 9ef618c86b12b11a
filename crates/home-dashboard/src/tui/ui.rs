//! Rendering of the dashboard screen.
//!
//! Layout, top to bottom: a two-line header (title, clock, date, greeting),
//! the panel grid, and a one-line footer. An open modal is drawn centred on
//! top of everything.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use crate::tui::app::{App, Panel};
use crate::tui::modal::{CredentialField, Modal};
use crate::tui::theme::Palette;

/// Header text displayed at the top of the dashboard.
pub const HEADER_TEXT: &str = "Home Dashboard";

/// Footer text showing the main key bindings.
pub const FOOTER_TEXT: &str = "[Tab] Panel  [j/k] Row  [h/l] Tab  [Enter] Open  [y] Copy  [a] Add  [Space] Done  [d] Delete  [r] Refresh  [w] Widgets  [s] Settings  [t] Theme  [q] Quit";

/// Terminal width from which the grid uses three columns.
pub const WIDE_LAYOUT_WIDTH: u16 = 150;

/// Shown in the body when every panel is hidden.
const EMPTY_BODY_TEXT: &str = "No widgets are shown. Press w to choose some.";

const CURSOR: &str = "▏";

/// Renders the full screen.
pub fn render_dashboard(frame: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::vertical([
        Constraint::Length(2), // header
        Constraint::Min(3),    // panels
        Constraint::Length(1), // footer
    ])
    .split(area);

    render_header(frame, app, &palette, chunks[0]);
    render_panels(frame, app, &palette, chunks[1]);
    render_footer(frame, app, &palette, chunks[2]);

    if let Some(modal) = &app.modal {
        render_modal(frame, modal, &palette, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let lines = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

    let clock = format!(
        "{}  {}",
        app.now.format("%H:%M"),
        app.now.format("%A, %B %-d, %Y")
    );
    let top = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(clock.chars().count() as u16),
    ])
    .split(lines[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            HEADER_TEXT,
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        top[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(clock, Style::default().fg(palette.accent)))
            .alignment(Alignment::Right),
        top[1],
    );

    let mut greeting = vec![Span::raw(app.greeting.to_string())];
    if app.is_refreshing() {
        greeting.push(Span::styled("  ⟳ refreshing", Style::default().fg(palette.muted)));
    }
    frame.render_widget(Paragraph::new(Line::from(greeting)), lines[1]);
}

/// Number of grid columns for a terminal `width` columns wide.
pub fn grid_columns(width: u16) -> usize {
    if width >= WIDE_LAYOUT_WIDTH {
        3
    } else {
        2
    }
}

fn render_panels(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    if app.panels.is_empty() {
        frame.render_widget(
            Paragraph::new(EMPTY_BODY_TEXT)
                .style(Style::default().fg(palette.muted))
                .alignment(Alignment::Center),
            area,
        );
        return;
    }

    let columns = grid_columns(area.width);
    let rows = app.panels.len().div_ceil(columns);
    let row_areas =
        Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);
    for (row, row_area) in row_areas.iter().enumerate() {
        let cells =
            Layout::horizontal(vec![Constraint::Ratio(1, columns as u32); columns]).split(*row_area);
        for (column, cell) in cells.iter().enumerate() {
            let index = row * columns + column;
            if let Some(panel) = app.panels.get(index) {
                render_panel(frame, panel, index == app.focus, palette, *cell);
            }
        }
    }
}

fn render_panel(frame: &mut Frame, panel: &Panel, focused: bool, palette: &Palette, area: Rect) {
    let border = if panel.view.failed {
        palette.failure
    } else if focused {
        palette.accent
    } else {
        palette.border
    };
    let mut title_style = Style::default().fg(border);
    if focused {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    let block = Block::bordered()
        .title(Span::styled(format!(" {} ", panel.view.title), title_style))
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut body = inner;
    if !panel.view.tabs.is_empty() {
        let split = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).split(inner);
        let tabs = Tabs::new(panel.view.tabs.iter().map(|t| t.title.clone()))
            .select(panel.tab)
            .highlight_style(
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, split[0]);
        body = split[1];
    }

    let rows = panel.view.visible_rows(panel.tab);
    let items: Vec<ListItem> = rows.iter().map(|row| ListItem::new(row.line.clone())).collect();
    let mut list = List::new(items);
    let mut state = ListState::default();
    if focused && !rows.is_empty() {
        list = list.highlight_style(palette.selection());
        state.select(Some(panel.selected));
    }
    frame.render_stateful_widget(list, body, &mut state);
}

fn render_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let line = match &app.status_message {
        Some((message, _)) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(palette.status),
        )),
        None => Line::from(Span::styled(FOOTER_TEXT, Style::default().fg(palette.muted))),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Centred rectangle `percent_x` wide and `height` rows tall.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height.min(area.height)),
        Constraint::Min(0),
    ])
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

fn render_modal(frame: &mut Frame, modal: &Modal, palette: &Palette, area: Rect) {
    let accent = Style::default().fg(palette.accent);
    let hint = Style::default().fg(palette.muted);
    let lines: Vec<Line> = match modal {
        Modal::Credentials(form) => {
            let field = |label: &str, value: &str, active: bool| {
                let marker = if active { "› " } else { "  " };
                let cursor = if active { CURSOR } else { "" };
                Line::from(vec![
                    Span::styled(marker.to_string(), accent),
                    Span::raw(format!("{label:<13}")),
                    Span::raw(format!("{value}{cursor}")),
                ])
            };
            vec![
                field(
                    "API key",
                    form.api_key.value(),
                    form.field == CredentialField::ApiKey,
                ),
                field(
                    "Calendar ID",
                    form.calendar_id.value(),
                    form.field == CredentialField::CalendarId,
                ),
                Line::raw(""),
                Line::styled("[Tab] Switch field  [Enter] Save  [Esc] Cancel", hint),
            ]
        }
        Modal::Widgets(toggles) => {
            let mut lines: Vec<Line> = toggles
                .entries
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    let mark = if entry.visible { "[x]" } else { "[ ]" };
                    let text = format!("{mark} {}", entry.display_name);
                    if index == toggles.selected {
                        Line::styled(text, palette.selection())
                    } else {
                        Line::raw(text)
                    }
                })
                .collect();
            lines.push(Line::raw(""));
            lines.push(Line::styled("[Space] Show/hide  [Esc] Close", hint));
            lines
        }
        Modal::Input(prompt) => vec![
            Line::raw(format!("{}{CURSOR}", prompt.field.value())),
            Line::raw(""),
            Line::styled("[Enter] Save  [Esc] Cancel", hint),
        ],
    };

    let rect = centered_rect(60, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, rect);
    let block = Block::bordered()
        .title(Span::styled(
            format!(" {} ", modal.title()),
            accent.add_modifier(Modifier::BOLD),
        ))
        .border_style(accent)
        .style(palette.base());
    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_utils::{find_row_with_text, row_text, test_app, test_terminal};
    use crate::widgets::{ViewRow, WidgetId, WidgetView};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn draw(app: &App, width: u16, height: u16) -> ratatui::buffer::Buffer {
        let mut terminal = test_terminal(width, height);
        terminal
            .draw(|frame| render_dashboard(frame, app))
            .expect("draw");
        terminal.backend().buffer().clone()
    }

    #[test]
    fn header_shows_title_clock_date_and_greeting() {
        let app = test_app(&[]);
        let buffer = draw(&app, 100, 20);
        let top = row_text(&buffer, 0);
        assert!(top.starts_with(HEADER_TEXT), "{top}");
        assert!(top.trim_end().ends_with("09:00  Monday, June 2, 2025"), "{top}");
        assert!(row_text(&buffer, 1).starts_with("Good morning"));
    }

    #[test]
    fn panels_render_in_a_two_column_grid() {
        let mut app = test_app(&[WidgetId::Reminder]);
        app.panels[0].view = WidgetView::new("Weather").with_row(ViewRow::text("18°C  Sunny"));
        let buffer = draw(&app, 100, 24);

        let weather_row = find_row_with_text(&buffer, " Weather ").expect("weather title");
        let news_row = find_row_with_text(&buffer, " News ").expect("news title");
        let reminder_row = find_row_with_text(&buffer, " Reminders ").expect("reminder title");
        assert_eq!(weather_row, news_row);
        assert!(reminder_row > weather_row);
        assert!(find_row_with_text(&buffer, "18°C  Sunny").is_some());
    }

    #[test]
    fn wide_terminal_uses_three_columns() {
        let app = test_app(&[WidgetId::Music]);
        let buffer = draw(&app, 160, 24);
        let weather_row = find_row_with_text(&buffer, " Weather ").expect("weather title");
        assert!(row_text(&buffer, weather_row).contains(" Music "));
        assert_eq!(grid_columns(149), 2);
        assert_eq!(grid_columns(150), 3);
    }

    #[test]
    fn failed_panel_border_uses_failure_colour() {
        let mut app = test_app(&[]);
        app.panels[1].view = WidgetView::error("News", "Could not load news: timeout");
        let buffer = draw(&app, 100, 20);
        let row = find_row_with_text(&buffer, "Could not load news").expect("error row");
        assert!(row > 2);
        let palette = Palette::for_theme(app.theme);
        let title_row = find_row_with_text(&buffer, " News ").expect("news title");
        let text = row_text(&buffer, title_row);
        let byte = text.find(" News ").expect("title col");
        let col = text[..byte].chars().count() as u16;
        assert_eq!(
            buffer.cell((col + 1, title_row)).expect("cell").fg,
            palette.failure
        );
    }

    #[test]
    fn footer_shows_hints_or_status() {
        let mut app = test_app(&[]);
        let buffer = draw(&app, 200, 10);
        assert!(row_text(&buffer, 9).starts_with("[Tab] Panel"));

        app.set_status("Copied link");
        let buffer = draw(&app, 200, 10);
        assert!(row_text(&buffer, 9).starts_with("Copied link"));
    }

    #[test]
    fn empty_body_explains_how_to_add_widgets() {
        let mut app = test_app(&[]);
        app.panels.clear();
        let buffer = draw(&app, 100, 12);
        assert!(find_row_with_text(&buffer, EMPTY_BODY_TEXT).is_some());
    }

    #[test]
    fn credentials_modal_draws_over_panels() {
        let mut app = test_app(&[]);
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        let buffer = draw(&app, 100, 24);
        assert!(find_row_with_text(&buffer, " Calendar settings ").is_some());
        let api_row = find_row_with_text(&buffer, "API key").expect("api key field");
        assert!(row_text(&buffer, api_row).contains("› "));
        assert!(find_row_with_text(&buffer, "Calendar ID").is_some());
    }

    #[test]
    fn widget_modal_lists_optional_widgets() {
        let mut app = test_app(&[WidgetId::Photo]);
        app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE));
        let buffer = draw(&app, 100, 30);
        assert!(find_row_with_text(&buffer, "[x] Photo frame").is_some());
        assert!(find_row_with_text(&buffer, "[ ] Transit").is_some());
        assert!(find_row_with_text(&buffer, "[ ] Weather").is_none());
    }

    #[test]
    fn notification_tabs_render() {
        let mut app = test_app(&[WidgetId::Notification]);
        let index = app
            .panels
            .iter()
            .position(|p| p.id == WidgetId::Notification)
            .expect("panel");
        app.panels[index].view = crate::widgets::notification::render();
        let buffer = draw(&app, 120, 24);
        let tabs = find_row_with_text(&buffer, "Gmail").expect("tab bar");
        assert!(row_text(&buffer, tabs).contains("Discord"));
    }
}
