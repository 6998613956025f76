use crate::app::{App, DisplayState};
use crate::ui::{markdown, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Tech Talk Idea Generator",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Enter a topic to get AI-powered tech talk ideas for your summit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

pub fn render_ideas_panel(frame: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Ideas ");

    let lines = match app.display() {
        DisplayState::Placeholder => {
            let pad = usize::from(area.height.saturating_sub(2)).saturating_sub(3) / 2;
            let mut lines: Vec<Line> = std::iter::repeat_with(|| Line::from(""))
                .take(pad)
                .collect();
            lines.push(Line::from(Span::styled(
                "Enter a topic below to generate tech talk ideas",
                Style::default().fg(theme.placeholder),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Try: \"AI in DevOps\", \"Kubernetes Best Practices\", \"GenAI for Developers\"",
                Style::default().fg(theme.placeholder),
            )));

            let placeholder = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }
        DisplayState::Spinner => {
            let pad = usize::from(area.height.saturating_sub(2)).saturating_sub(1) / 2;
            let mut lines: Vec<Line> = std::iter::repeat_with(|| Line::from(""))
                .take(pad)
                .collect();
            lines.push(Line::from(Span::styled(
                "Generating tech talk ideas...",
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::ITALIC),
            )));

            let spinner = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(spinner, area);
            return;
        }
        DisplayState::Ideas(text) => {
            let mut lines: Vec<Line<'static>> = Vec::new();
            let mut in_code_block = false;

            for content_line in text.lines() {
                if markdown::is_code_fence(content_line) {
                    if in_code_block {
                        lines.push(Line::from(Span::styled(
                            format!("└{}", "─".repeat(40)),
                            Style::default().fg(Color::DarkGray),
                        )));
                        in_code_block = false;
                    } else {
                        in_code_block = true;
                        let language = markdown::extract_code_language(content_line)
                            .unwrap_or_else(|| "code".to_string());
                        lines.push(Line::from(Span::styled(
                            format!("┌─ {language} {}", "─".repeat(35_usize.saturating_sub(language.len()))),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                } else if in_code_block {
                    lines.push(Line::from(Span::styled(
                        format!("  {content_line}"),
                        Style::default().fg(Color::Green),
                    )));
                } else if content_line.is_empty() {
                    lines.push(Line::from(""));
                } else {
                    lines.extend(markdown::render_markdown_to_lines(content_line));
                }
            }
            lines
        }
    };

    // Clamp scroll to the wrapped line count so End and auto-scroll land on
    // the real bottom
    let available_width = usize::from(area.width.saturating_sub(2)).max(1);
    let total_visual_lines: usize = lines
        .iter()
        .map(|line| {
            let line_width = line.width();
            if line_width == 0 {
                1
            } else {
                line_width.div_ceil(available_width)
            }
        })
        .sum();
    let visible_height = usize::from(area.height.saturating_sub(2));
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);
    app.scroll_offset = actual_scroll;

    let ideas = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0))
        .block(block);
    frame.render_widget(ideas, area);
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_loading() {
        format!("{} [Generating...]", app.endpoint_url)
    } else {
        app.endpoint_url.clone()
    };

    let status_bar = Paragraph::new(status)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    frame.render_widget(status_bar, area);
}

pub fn render_topic_field(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let (display_text, style) = if app.topic.is_empty() {
        (
            "Enter a topic (e.g., AI in DevOps, Cloud Security, MLOps)",
            Style::default().fg(Color::Gray),
        )
    } else {
        (
            app.topic.as_str(),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
    };

    let topic_field = Paragraph::new(display_text)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent))
                .title(" Topic "),
        );
    frame.render_widget(topic_field, area);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if app.is_loading() {
        (
            "Generating... | Esc: Cancel | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "Enter: Generate Ideas | Ctrl+H: Help | Ctrl+C: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    let bottom_bar = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(bottom_bar, area);
}

pub fn render_help_window(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    let section = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled("General", section)),
        Line::from("  Ctrl+C (twice)   Quit"),
        Line::from("  Ctrl+Q           Quit immediately"),
        Line::from("  Ctrl+H           Toggle this help"),
        Line::from(""),
        Line::from(Span::styled("Ideas", section)),
        Line::from("  Type             Edit the topic"),
        Line::from("  Enter            Generate ideas"),
        Line::from("  Esc              Cancel a running generation"),
        Line::from(""),
        Line::from(Span::styled("Navigation", section)),
        Line::from("  Up / Down        Scroll one line"),
        Line::from("  PgUp / PgDn      Scroll ten lines"),
        Line::from("  Home / End       Jump to top / bottom"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = u16::try_from(help_text.len())
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(area.height.saturating_sub(2));
    let popup = Rect::new(
        area.x + area.width.saturating_sub(popup_width) / 2,
        area.y + area.height.saturating_sub(popup_height) / 2,
        popup_width,
        popup_height,
    );

    frame.render_widget(Clear, popup);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(" TalkGen - Keyboard Shortcuts "),
    );
    frame.render_widget(help, popup);
}
