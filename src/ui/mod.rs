pub mod markdown;
pub mod widgets;

use crate::app::App;
use crate::models::ThemeConfig;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Color,
    Frame,
};

/// Colors resolved once from config so render code never re-parses strings.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub placeholder: Color,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            accent: config.accent_color.parse().unwrap_or(Color::Cyan),
            placeholder: config.placeholder_color.parse().unwrap_or(Color::DarkGray),
        }
    }
}

pub fn render(frame: &mut Frame, app: &mut App, theme: &Theme) {
    let area = frame.area();

    // Grow the topic field with its content, up to half the screen
    let available_width = usize::from(area.width.saturating_sub(2)).max(1);
    let topic_chars = app.topic.chars().count();
    let needed_lines = if topic_chars == 0 {
        1
    } else {
        topic_chars.div_ceil(available_width)
    };
    let max_topic_lines = usize::from(area.height / 2).saturating_sub(2).max(1);
    let topic_lines = needed_lines.clamp(1, max_topic_lines);
    let topic_height = u16::try_from(topic_lines + 2).unwrap_or(u16::MAX);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(topic_height),
            Constraint::Length(1),
        ])
        .split(area);

    widgets::render_header(frame, theme, chunks[0]);
    widgets::render_ideas_panel(frame, app, theme, chunks[1]);
    widgets::render_status_bar(frame, app, chunks[2]);
    widgets::render_topic_field(frame, app, theme, chunks[3]);
    widgets::render_bottom_bar(frame, app, chunks[4]);

    if app.show_help {
        widgets::render_help_window(frame, theme);
    }
}
