//! TUI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use hostel_core::Role;
use hostel_core::chat::{Message, Sender};

use crate::app::{App, AppMode};

/// Draw the full UI.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let frame_width = frame.area().width;
    let inner_input_width = frame_width.saturating_sub(2) as usize;
    let input_lines = if inner_input_width == 0 || app.input.is_empty() {
        1
    } else {
        wrapped_rows(UnicodeWidthStr::width(app.input.as_str()), inner_input_width)
    };
    let max_input_height = frame.area().height / 3;
    let input_height = (input_lines + 2).min(max_input_height).max(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Header
            Constraint::Min(5),               // Messages
            Constraint::Length(1),            // Suggestions
            Constraint::Length(input_height), // Input
            Constraint::Length(1),            // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_messages(frame, app, chunks[1]);
    draw_suggestions(frame, app, chunks[2]);
    draw_input(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);
}

#[allow(clippy::cast_possible_truncation)]
fn wrapped_rows(display_width: usize, inner_width: usize) -> u16 {
    1u16.max(display_width.div_ceil(inner_width) as u16)
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let session = if app.session_id.is_empty() {
        String::new()
    } else {
        format!(" | Session: {}", &app.session_id[..8.min(app.session_id.len())])
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Hostel Assistant",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" | {} ({})", app.user_name, app.role)),
        Span::raw(session),
    ]));

    frame.render_widget(header, area);
}

fn message_lines(msg: &Message, role: Role, selected: bool) -> Vec<Line<'static>> {
    let (prefix, color) = match msg.sender {
        Sender::User => ("You: ", Color::Green),
        Sender::Bot => ("Assistant: ", Color::Blue),
    };
    let mut prefix_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
    if selected {
        prefix_style = prefix_style.add_modifier(Modifier::REVERSED);
    }

    let mut lines = Vec::new();
    let indent = " ".repeat(prefix.len());
    for (i, text) in msg.text.split('\n').enumerate() {
        let lead = if i == 0 {
            Span::styled(prefix, prefix_style)
        } else {
            Span::raw(indent.clone())
        };
        lines.push(Line::from(vec![lead, Span::raw(text.to_string())]));
    }

    let dim = Style::default().fg(Color::DarkGray);
    for action in &msg.actions {
        lines.push(Line::from(vec![
            Span::raw(indent.clone()),
            Span::styled(format!("[{}]", action.label), Style::default().fg(Color::Cyan)),
            Span::styled(format!(" {}", action.route.path(role)), dim),
        ]));
    }

    let mut meta = Vec::new();
    if !msg.reactions.is_empty() {
        let emojis: Vec<&str> = msg.reactions.iter().map(|r| r.kind.emoji()).collect();
        meta.push(emojis.join(" "));
    }
    match msg.was_helpful {
        Some(true) => meta.push("helpful".to_string()),
        Some(false) => meta.push("not helpful".to_string()),
        None => {}
    }
    if !meta.is_empty() {
        lines.push(Line::from(vec![
            Span::raw(indent),
            Span::styled(meta.join(" | "), dim),
        ]));
    }
    lines
}

fn draw_messages(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for (idx, msg) in app.visible_messages() {
        let selected = app.mode == AppMode::Select && app.selected == Some(idx);
        lines.extend(message_lines(msg, app.role, selected));
    }
    if app.typing {
        lines.push(Line::from(Span::styled(
            "Assistant is typing...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2) as usize;

    let total: u16 = lines
        .iter()
        .map(|line| {
            if inner_width == 0 {
                return 1u16;
            }
            let display_width: usize = line
                .spans
                .iter()
                .map(|s| UnicodeWidthStr::width(s.content.as_ref()))
                .sum();
            wrapped_rows(display_width, inner_width)
        })
        .sum();

    app.viewport_height = inner_height;
    app.total_lines = total;

    let max_scroll = total.saturating_sub(inner_height);
    let scroll = if app.scroll_pinned {
        max_scroll
    } else {
        max_scroll.saturating_sub(app.scroll_offset)
    };

    let mut title = app
        .filter
        .as_ref()
        .map_or_else(|| "Conversation".to_string(), |f| format!("Search: {f}"));
    if !app.scroll_pinned {
        title.push_str(&format!(" [scroll: {}/{}]", max_scroll - scroll, max_scroll));
    }

    let messages = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(messages, area);
}

fn draw_suggestions(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled("Try: ", Style::default().fg(Color::DarkGray))];
    for (i, s) in app.suggestions.iter().take(9).enumerate() {
        spans.push(Span::styled(
            format!("Alt+{} ", i + 1),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::raw(format!("{}  ", s.label)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = match app.mode {
        AppMode::Select => "Select: Up/Down move, 1-5 react, y/n helpful, d delete, Esc back",
        AppMode::Normal if app.typing => "Input (assistant is typing)",
        AppMode::Normal => "Input",
    };
    let input = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);

    if app.mode == AppMode::Select {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_display_width =
        UnicodeWidthStr::width(&app.input[..app.cursor_pos.min(app.input.len())]);

    #[allow(clippy::cast_possible_truncation)]
    let (cursor_row, cursor_col) = if inner_width == 0 {
        (0u16, 0u16)
    } else {
        (
            (cursor_display_width / inner_width) as u16,
            (cursor_display_width % inner_width) as u16,
        )
    };

    let cursor_x = area.x.saturating_add(1).saturating_add(cursor_col);
    let cursor_y = area.y.saturating_add(1).saturating_add(cursor_row);
    let cursor_x = cursor_x.min(area.x.saturating_add(area.width.saturating_sub(2)));
    let cursor_y = cursor_y.min(area.y.saturating_add(area.height.saturating_sub(2)));
    frame.set_cursor_position((cursor_x, cursor_y));
}

fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let keys = match app.mode {
        AppMode::Normal => " | Tab: select | /help | Ctrl+C: quit",
        AppMode::Select => " | Esc: back | Ctrl+C: quit",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(&app.status, Style::default().fg(Color::DarkGray)),
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(status, area);
}
