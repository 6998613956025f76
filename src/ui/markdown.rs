// Simple markdown rendering for terminal display

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::iter::Peekable;
use std::str::Chars;

/// Convert markdown text to ratatui Lines with styling
pub fn render_markdown_to_lines(markdown: &str) -> Vec<Line<'static>> {
    markdown.lines().map(render_markdown_line).collect()
}

/// Check if a line is a markdown table row
pub fn is_table_row(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.matches('|').count() >= 2
}

/// Check if a line is a table separator (|---|---|)
pub fn is_table_separator(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') || !trimmed.ends_with('|') {
        return false;
    }

    trimmed
        .chars()
        .all(|c| c == '|' || c == '-' || c == ' ' || c == ':')
}

/// Render a markdown table row - simplified for better readability
fn render_table_row(line: &str) -> Line<'static> {
    let trimmed = line.trim();
    let content = trimmed.trim_start_matches('|').trim_end_matches('|');

    // Column alignment is not worth it in a streaming view; clear separators
    // read well enough
    let cells: Vec<&str> = content.split('|').map(str::trim).collect();
    let formatted = cells.join(" | ");

    Line::from(Span::styled(
        format!("  {formatted}"),
        Style::default().fg(Color::Cyan),
    ))
}

/// Consume characters until a doubled delimiter (e.g. `**` or `~~`) closes.
/// Returns the enclosed text and whether the closer was actually found.
fn consume_until_pair(chars: &mut Peekable<Chars<'_>>, delim: char) -> (String, bool) {
    let mut text = String::new();
    while let Some(ch) = chars.next() {
        if ch == delim && chars.peek() == Some(&delim) {
            chars.next();
            return (text, true);
        }
        text.push(ch);
    }
    (text, false)
}

/// Render a single line of markdown with basic styling
fn render_markdown_line(line: &str) -> Line<'static> {
    // Table rows get their own treatment before inline parsing
    if is_table_separator(line) {
        return Line::from("");
    }
    if is_table_row(line) {
        return render_table_row(line);
    }

    let mut spans = Vec::new();
    let mut current_text = String::new();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            // Bold: **text**
            '*' if chars.peek() == Some(&'*') => {
                chars.next();

                // Flush the preceding text only once the pair is known to
                // close; an unclosed marker stays part of the literal run
                let (bold_text, closed) = consume_until_pair(&mut chars, '*');
                if closed {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(current_text.clone()));
                        current_text.clear();
                    }
                    spans.push(Span::styled(
                        bold_text,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ));
                } else {
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            }
            // Strikethrough: ~~text~~
            '~' if chars.peek() == Some(&'~') => {
                chars.next();

                let (struck_text, closed) = consume_until_pair(&mut chars, '~');
                if closed {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(current_text.clone()));
                        current_text.clear();
                    }
                    spans.push(Span::styled(
                        struck_text,
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::CROSSED_OUT),
                    ));
                } else {
                    current_text.push_str("~~");
                    current_text.push_str(&struck_text);
                }
            }
            // Inline code: `code`
            '`' => {
                let mut code_text = String::new();
                let mut found_close = false;
                for ch in chars.by_ref() {
                    if ch == '`' {
                        found_close = true;
                        break;
                    }
                    code_text.push(ch);
                }

                if found_close {
                    if !current_text.is_empty() {
                        spans.push(Span::raw(current_text.clone()));
                        current_text.clear();
                    }
                    spans.push(Span::styled(code_text, Style::default().fg(Color::Magenta)));
                } else {
                    current_text.push('`');
                    current_text.push_str(&code_text);
                }
            }
            // Headers: # ## ###
            '#' if current_text.is_empty() => {
                let mut level = 1;
                while chars.peek() == Some(&'#') {
                    level += 1;
                    chars.next();
                }

                if chars.peek() == Some(&' ') {
                    chars.next();
                }

                let header_text: String = chars.collect();
                let color = match level {
                    1 => Color::Yellow,
                    2 => Color::Cyan,
                    _ => Color::Blue,
                };

                return Line::from(Span::styled(
                    header_text.trim().to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ));
            }
            // List items: - item or * item, with optional task checkboxes
            '-' | '*' if current_text.is_empty() && chars.peek() == Some(&' ') => {
                chars.next();
                let rest: String = chars.collect();
                let rest = rest.trim();

                if let Some(item) = rest.strip_prefix("[ ] ") {
                    spans.push(Span::styled("☐ ", Style::default().fg(Color::Cyan)));
                    spans.push(Span::raw(item.to_string()));
                } else if let Some(item) = rest
                    .strip_prefix("[x] ")
                    .or_else(|| rest.strip_prefix("[X] "))
                {
                    spans.push(Span::styled("☑ ", Style::default().fg(Color::Green)));
                    spans.push(Span::styled(
                        item.to_string(),
                        Style::default().fg(Color::DarkGray),
                    ));
                } else {
                    spans.push(Span::styled("• ", Style::default().fg(Color::Cyan)));
                    spans.push(Span::raw(rest.to_string()));
                }
                break;
            }
            _ => {
                current_text.push(ch);
            }
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::from("")
    } else {
        Line::from(spans)
    }
}

/// Detect if a line is a code block fence
pub fn is_code_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// Extract language from code fence
pub fn extract_code_language(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("```")
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(ToString::to_string)
}
