//! Colour palettes for the two themes.

use ratatui::style::{Color, Modifier, Style};

use crate::Theme;

/// Colours used by every part of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Screen background.
    pub background: Color,
    /// Body text.
    pub foreground: Color,
    /// Title, clock and focused border.
    pub accent: Color,
    /// Unfocused panel border.
    pub border: Color,
    /// Border of a panel whose refresh failed.
    pub failure: Color,
    /// Footer hints.
    pub muted: Color,
    /// Footer status messages.
    pub status: Color,
}

impl Palette {
    /// Palette for `theme`.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Black,
                foreground: Color::White,
                accent: Color::Cyan,
                border: Color::DarkGray,
                failure: Color::Red,
                muted: Color::DarkGray,
                status: Color::Yellow,
            },
            Theme::Light => Self {
                background: Color::White,
                foreground: Color::Black,
                accent: Color::Blue,
                border: Color::Gray,
                failure: Color::Red,
                muted: Color::Gray,
                status: Color::Magenta,
            },
        }
    }

    /// Base style of the whole screen.
    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    /// Style of the selected row in the focused panel.
    pub fn selection(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
