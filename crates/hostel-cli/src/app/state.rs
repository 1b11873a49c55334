//! Application state and types.

use std::collections::VecDeque;

use hostel_core::Role;
use hostel_core::chat::{Message, Sender, SuggestedAction};
use hostel_service::ChatEvent;

const INPUT_HISTORY_CAP: usize = 100;

/// Application mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Typing into the input box.
    Normal,
    /// Browsing messages to react, vote, or delete.
    Select,
}

/// TUI application state.
pub struct App {
    pub mode: AppMode,
    pub role: Role,
    pub user_name: String,
    pub session_id: String,
    pub user_id: String,
    pub messages: Vec<Message>,
    pub input: String,
    pub cursor_pos: usize,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    /// Manual scroll offset from the bottom (0 = pinned to bottom).
    pub scroll_offset: u16,
    /// Whether the view follows new messages.
    pub scroll_pinned: bool,
    /// Height of the message viewport (set each frame by the renderer).
    pub viewport_height: u16,
    /// Total line count of rendered messages (set each frame by the renderer).
    pub total_lines: u16,
    pub should_quit: bool,
    pub status: String,
    pub typing: bool,
    /// Index into `messages` while in [`AppMode::Select`].
    pub selected: Option<usize>,
    /// Case-insensitive text filter set by `/search`.
    pub filter: Option<String>,
    pub suggestions: Vec<SuggestedAction>,
}

impl App {
    pub fn new(role: Role, user_name: impl Into<String>) -> Self {
        Self {
            mode: AppMode::Normal,
            role,
            user_name: user_name.into(),
            session_id: String::new(),
            user_id: String::new(),
            messages: Vec::new(),
            input: String::new(),
            cursor_pos: 0,
            input_history: VecDeque::with_capacity(INPUT_HISTORY_CAP),
            history_index: None,
            scroll_offset: 0,
            scroll_pinned: true,
            viewport_height: 0,
            total_lines: 0,
            should_quit: false,
            status: "Ready".to_string(),
            typing: false,
            selected: None,
            filter: None,
            suggestions: Vec::new(),
        }
    }

    /// Messages passing the current `/search` filter.
    pub fn visible_messages(&self) -> impl Iterator<Item = (usize, &Message)> {
        let needle = self.filter.as_deref().map(str::to_lowercase);
        self.messages
            .iter()
            .enumerate()
            .filter(move |(_, m)| {
                needle
                    .as_deref()
                    .is_none_or(|n| m.text.to_lowercase().contains(n))
            })
    }

    pub fn selected_message(&self) -> Option<&Message> {
        self.selected.and_then(|i| self.messages.get(i))
    }

    /// Apply a session event.
    pub fn handle_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::MessageAdded(msg) => {
                if !self.messages.iter().any(|m| m.id == msg.id) {
                    self.messages.push(msg);
                }
                if self.scroll_pinned {
                    self.scroll_to_bottom();
                }
            }
            ChatEvent::MessageUpdated(msg) => {
                if let Some(slot) = self.messages.iter_mut().find(|m| m.id == msg.id) {
                    *slot = msg;
                }
            }
            ChatEvent::MessageDeleted(id) => {
                if let Some(pos) = self.messages.iter().position(|m| m.id == id) {
                    self.messages.remove(pos);
                    self.fix_selection();
                }
            }
            ChatEvent::Typing(on) => self.typing = on,
            ChatEvent::Error(e) => self.status = format!("Error: {e}"),
        }
    }

    /// Take the input line, recording it in the history. Blank input yields `None`.
    pub fn submit_input(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        self.cursor_pos = 0;
        self.history_index = None;
        if self.input_history.len() == INPUT_HISTORY_CAP {
            self.input_history.pop_front();
        }
        self.input_history.push_back(text.clone());
        Some(text)
    }

    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
            self.cursor_pos -= c.len_utf8();
            self.input.remove(self.cursor_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_pos < self.input.len() {
            self.input.remove(self.cursor_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        if let Some(c) = self.input[..self.cursor_pos].chars().next_back() {
            self.cursor_pos -= c.len_utf8();
        }
    }

    pub fn cursor_right(&mut self) {
        if let Some(c) = self.input[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }

    pub const fn cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_pos = self.input.len();
    }

    /// Recall an older input line.
    pub fn history_up(&mut self) {
        if self.input_history.is_empty() {
            return;
        }
        let idx = match self.history_index {
            Some(0) => 0,
            Some(i) => i - 1,
            None => self.input_history.len() - 1,
        };
        self.set_input_from_history(idx);
    }

    /// Move toward newer input; past the newest clears the line.
    pub fn history_down(&mut self) {
        match self.history_index {
            Some(i) if i + 1 < self.input_history.len() => self.set_input_from_history(i + 1),
            Some(_) => {
                self.history_index = None;
                self.input.clear();
                self.cursor_pos = 0;
            }
            None => {}
        }
    }

    fn set_input_from_history(&mut self, idx: usize) {
        if let Some(text) = self.input_history.get(idx) {
            self.input.clone_from(text);
            self.cursor_pos = self.input.len();
            self.history_index = Some(idx);
        }
    }

    /// Enter select mode on the newest bot message.
    pub fn enter_select(&mut self) {
        let last_bot = self
            .visible_messages()
            .filter(|(_, m)| m.sender == Sender::Bot)
            .map(|(i, _)| i)
            .last();
        let Some(idx) = last_bot.or_else(|| self.visible_messages().map(|(i, _)| i).last()) else {
            self.status = "No messages to select".to_string();
            return;
        };
        self.selected = Some(idx);
        self.mode = AppMode::Select;
    }

    pub fn leave_select(&mut self) {
        self.selected = None;
        self.mode = AppMode::Normal;
    }

    pub fn select_prev(&mut self) {
        let Some(cur) = self.selected else { return };
        let prev = self
            .visible_messages()
            .map(|(i, _)| i)
            .filter(|i| *i < cur)
            .last();
        if let Some(i) = prev {
            self.selected = Some(i);
        }
    }

    pub fn select_next(&mut self) {
        let Some(cur) = self.selected else { return };
        let next = self
            .visible_messages()
            .map(|(i, _)| i)
            .find(|i| *i > cur);
        if let Some(i) = next {
            self.selected = Some(i);
        }
    }

    fn fix_selection(&mut self) {
        match self.selected {
            Some(_) if self.messages.is_empty() => self.leave_select(),
            Some(i) if i >= self.messages.len() => self.selected = Some(self.messages.len() - 1),
            _ => {}
        }
    }

    /// Scroll up by `n` lines.
    pub fn scroll_up(&mut self, n: u16) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.saturating_add(n).min(max_scroll);
        if self.scroll_offset > 0 {
            self.scroll_pinned = false;
        }
    }

    /// Scroll down by `n` lines.
    pub fn scroll_down(&mut self, n: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
        if self.scroll_offset == 0 {
            self.scroll_pinned = true;
        }
    }

    /// Snap scroll to the most recent messages.
    pub const fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
        self.scroll_pinned = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Role::Student, "Asha")
    }

    #[test]
    fn added_messages_are_deduplicated() {
        let mut app = app();
        let msg = Message::user("hi");
        app.handle_event(ChatEvent::MessageAdded(msg.clone()));
        app.handle_event(ChatEvent::MessageAdded(msg));
        assert_eq!(app.messages.len(), 1);
    }

    #[test]
    fn updates_replace_in_place() {
        let mut app = app();
        let mut msg = Message::bot("hello", Vec::new());
        app.handle_event(ChatEvent::MessageAdded(msg.clone()));
        msg.was_helpful = Some(true);
        app.handle_event(ChatEvent::MessageUpdated(msg));
        assert_eq!(app.messages[0].was_helpful, Some(true));
    }

    #[test]
    fn deleting_selected_last_message_moves_selection() {
        let mut app = app();
        app.handle_event(ChatEvent::MessageAdded(Message::user("a")));
        let last = Message::bot("b", Vec::new());
        app.handle_event(ChatEvent::MessageAdded(last.clone()));
        app.enter_select();
        assert_eq!(app.selected, Some(1));
        app.handle_event(ChatEvent::MessageDeleted(last.id));
        assert_eq!(app.selected, Some(0));
    }

    #[test]
    fn typing_and_errors_update_status() {
        let mut app = app();
        app.handle_event(ChatEvent::Typing(true));
        assert!(app.typing);
        app.handle_event(ChatEvent::Error("disk full".into()));
        assert_eq!(app.status, "Error: disk full");
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut app = app();
        app.input = "   ".into();
        assert!(app.submit_input().is_none());
        assert!(app.input_history.is_empty());
    }

    #[test]
    fn input_history_navigation() {
        let mut app = app();
        for text in ["first", "second"] {
            app.input = text.into();
            app.submit_input().unwrap();
        }
        app.history_up();
        assert_eq!(app.input, "second");
        app.history_up();
        assert_eq!(app.input, "first");
        app.history_up();
        assert_eq!(app.input, "first");
        app.history_down();
        assert_eq!(app.input, "second");
        app.history_down();
        assert!(app.input.is_empty());
        assert_eq!(app.history_index, None);
    }

    #[test]
    fn cursor_respects_multibyte_chars() {
        let mut app = app();
        app.insert_char('é');
        app.insert_char('x');
        assert_eq!(app.cursor_pos, 3);
        app.cursor_left();
        assert_eq!(app.cursor_pos, 2);
        app.backspace();
        assert_eq!(app.input, "x");
        assert_eq!(app.cursor_pos, 0);
        app.cursor_end();
        app.delete_forward();
        assert_eq!(app.input, "x");
    }

    #[test]
    fn select_walks_visible_messages_only() {
        let mut app = app();
        for text in ["room please", "bill", "room again"] {
            app.handle_event(ChatEvent::MessageAdded(Message::user(text)));
        }
        app.filter = Some("ROOM".into());
        app.enter_select();
        assert_eq!(app.selected, Some(2));
        app.select_prev();
        assert_eq!(app.selected, Some(0));
        app.select_prev();
        assert_eq!(app.selected, Some(0));
        app.select_next();
        assert_eq!(app.selected, Some(2));
        app.leave_select();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.selected.is_none());
    }

    #[test]
    fn select_on_empty_history_stays_normal() {
        let mut app = app();
        app.enter_select();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn scroll_bounds() {
        let mut app = app();
        app.total_lines = 50;
        app.viewport_height = 20;
        app.scroll_up(100);
        assert_eq!(app.scroll_offset, 30);
        assert!(!app.scroll_pinned);
        app.scroll_down(30);
        assert!(app.scroll_pinned);
    }
}
