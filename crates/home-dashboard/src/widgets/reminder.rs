//! Task list panel.

use futures::future::{self, BoxFuture, FutureExt};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::view::dim_style;
use super::{
    InputKind, RefreshContext, RowKey, ViewRow, Widget, WidgetError, WidgetId, WidgetUpdate,
    WidgetView,
};
use crate::config::Config;
use crate::Task;

/// Renders the stored tasks; edits go through the preference store.
pub struct ReminderWidget;

/// Factory used by the descriptor table.
pub fn create(_config: &Config) -> Box<dyn Widget> {
    Box::new(ReminderWidget)
}

impl Widget for ReminderWidget {
    fn id(&self) -> WidgetId {
        WidgetId::Reminder
    }

    fn refresh<'a>(
        &'a self,
        ctx: &'a RefreshContext,
    ) -> BoxFuture<'a, Result<WidgetUpdate, WidgetError>> {
        future::ready(Ok(WidgetUpdate::view(render(&ctx.tasks)))).boxed()
    }
}

/// One row per task, keyed by index.
pub fn render(tasks: &[Task]) -> WidgetView {
    let mut view = WidgetView::new("Reminders").with_input(InputKind::AddTask);
    if tasks.is_empty() {
        view.push(ViewRow::styled("No tasks. Press a to add one.", dim_style()));
    }
    for (index, task) in tasks.iter().enumerate() {
        let line = if task.completed {
            Line::from(vec![
                Span::styled("[x] ", Style::default().fg(Color::Green)),
                Span::styled(
                    task.text.clone(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                ),
            ])
        } else {
            Line::from(vec![Span::raw("[ ] "), Span::raw(task.text.clone())])
        };
        view.push(ViewRow::from_line(line).with_key(RowKey::Task(index)));
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_render_with_marks_and_keys() {
        let tasks = vec![
            Task::new("Buy rice"),
            Task {
                text: "Pay rent".to_string(),
                completed: true,
            },
        ];
        let view = render(&tasks);
        assert_eq!(
            view.to_plain_lines(),
            vec!["[ ] Buy rice".to_string(), "[x] Pay rent".to_string()]
        );
        assert_eq!(view.rows[1].key, Some(RowKey::Task(1)));
        assert_eq!(view.input, Some(InputKind::AddTask));
    }

    #[test]
    fn empty_list_shows_hint() {
        let view = render(&[]);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].key, None);
    }
}
