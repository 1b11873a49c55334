//! Key handling for the chat TUI.
//!
//! Keys only touch [`App`]; anything that needs the chat session comes back
//! as a [`UiCommand`] for the event loop to run.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hostel_core::chat::ReactionKind;

use crate::app::{App, AppMode};

const HELP: &str = "Enter: send | Tab: select message | Alt+N: quick reply | \
                    /search TEXT | /clear | /export FILE | /quit";

/// Work for the session, produced by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Send(String),
    React { message_id: String, kind: ReactionKind },
    Helpful { message_id: String, helpful: bool },
    Delete(String),
    Export(PathBuf),
}

/// Reaction bound to a number key in select mode.
fn reaction_for_key(c: char) -> Option<ReactionKind> {
    let idx = c.to_digit(10)?.checked_sub(1)?;
    ReactionKind::ALL.get(idx as usize).copied()
}

/// Update `app` for one key press.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }
    match key.code {
        KeyCode::PageUp => {
            app.scroll_up(app.viewport_height.max(1));
            return None;
        }
        KeyCode::PageDown => {
            app.scroll_down(app.viewport_height.max(1));
            return None;
        }
        _ => {}
    }
    match app.mode {
        AppMode::Normal => handle_normal_key(app, key),
        AppMode::Select => handle_select_key(app, key.code),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) -> Option<UiCommand> {
    if key.modifiers.contains(KeyModifiers::ALT)
        && let KeyCode::Char(c) = key.code
    {
        let idx = c.to_digit(10)?.checked_sub(1)? as usize;
        let label = app.suggestions.get(idx)?.label.clone();
        app.scroll_to_bottom();
        return Some(UiCommand::Send(label));
    }

    match key.code {
        KeyCode::Enter => {
            let text = app.submit_input()?;
            let trimmed = text.trim();
            match trimmed.strip_prefix('/') {
                Some(cmd) => slash_command(app, cmd),
                None => {
                    app.scroll_to_bottom();
                    Some(UiCommand::Send(text))
                }
            }
        }
        KeyCode::Char(c) => {
            app.insert_char(c);
            None
        }
        KeyCode::Backspace => {
            app.backspace();
            None
        }
        KeyCode::Delete => {
            app.delete_forward();
            None
        }
        KeyCode::Left => {
            app.cursor_left();
            None
        }
        KeyCode::Right => {
            app.cursor_right();
            None
        }
        KeyCode::Home => {
            app.cursor_home();
            None
        }
        KeyCode::End => {
            app.cursor_end();
            None
        }
        KeyCode::Up => {
            app.history_up();
            None
        }
        KeyCode::Down => {
            app.history_down();
            None
        }
        KeyCode::Tab => {
            app.enter_select();
            None
        }
        KeyCode::Esc => {
            if app.filter.take().is_some() {
                app.status = "Search cleared".to_string();
            }
            None
        }
        _ => None,
    }
}

fn slash_command(app: &mut App, body: &str) -> Option<UiCommand> {
    let (name, arg) = body
        .split_once(char::is_whitespace)
        .map_or((body, ""), |(n, a)| (n, a.trim()));
    match name {
        "quit" | "exit" => app.should_quit = true,
        "help" => app.status = HELP.to_string(),
        "search" if arg.is_empty() => app.filter = None,
        "search" => app.filter = Some(arg.to_string()),
        "clear" => {
            app.filter = None;
            app.status = "Search cleared".to_string();
        }
        "export" if arg.is_empty() => app.status = "Usage: /export FILE".to_string(),
        "export" => return Some(UiCommand::Export(PathBuf::from(arg))),
        other => app.status = format!("Unknown command: /{other}"),
    }
    None
}

fn handle_select_key(app: &mut App, code: KeyCode) -> Option<UiCommand> {
    match code {
        KeyCode::Esc | KeyCode::Tab => {
            app.leave_select();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            None
        }
        KeyCode::Char('y' | 'n' | 'd' | '1'..='9') | KeyCode::Enter => {
            let msg = app.selected_message()?;
            let message_id = msg.id.clone();
            match code {
                KeyCode::Char('y') => Some(UiCommand::Helpful {
                    message_id,
                    helpful: true,
                }),
                KeyCode::Char('n') => Some(UiCommand::Helpful {
                    message_id,
                    helpful: false,
                }),
                KeyCode::Char('d') => Some(UiCommand::Delete(message_id)),
                KeyCode::Char(c) => {
                    reaction_for_key(c).map(|kind| UiCommand::React { message_id, kind })
                }
                _ => {
                    let role = app.role;
                    let targets: Vec<String> = msg
                        .actions
                        .iter()
                        .map(|a| format!("{} -> {}", a.label, a.route.path(role)))
                        .collect();
                    if !targets.is_empty() {
                        app.status = targets.join(" | ");
                    }
                    None
                }
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hostel_core::chat::{Message, SuggestedAction};
    use hostel_core::{Role, Route};
    use hostel_service::ChatEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    fn app_with_bot_message() -> (App, String) {
        let mut app = App::new(Role::Student, "Asha");
        let msg = Message::bot(
            "Bills are on the billing page.",
            vec![SuggestedAction::new("Check Bills", Route::Billing)],
        );
        let id = msg.id.clone();
        app.handle_event(ChatEvent::MessageAdded(msg));
        (app, id)
    }

    #[test]
    fn enter_sends_typed_text() {
        let mut app = App::new(Role::Student, "Asha");
        type_text(&mut app, "my bill");
        let cmd = handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(cmd, Some(UiCommand::Send("my bill".into())));
        assert!(app.input.is_empty());
    }

    #[test]
    fn enter_on_blank_input_does_nothing() {
        let mut app = App::new(Role::Student, "Asha");
        type_text(&mut app, "  ");
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = App::new(Role::Student, "Asha");
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn alt_digit_sends_quick_reply() {
        let mut app = App::new(Role::Admin, "Warden");
        app.suggestions = hostel_core::assistant::suggested_replies(Role::Admin);
        let cmd = handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('3'), KeyModifiers::ALT),
        );
        assert_eq!(cmd, Some(UiCommand::Send("Manage Rooms".into())));
        let none = handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('9'), KeyModifiers::ALT),
        );
        assert_eq!(none, None);
    }

    #[test]
    fn slash_commands() {
        let mut app = App::new(Role::Student, "Asha");
        type_text(&mut app, "/search room");
        assert_eq!(handle_key(&mut app, key(KeyCode::Enter)), None);
        assert_eq!(app.filter.as_deref(), Some("room"));

        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.filter.is_none());

        type_text(&mut app, "/export chat.csv");
        assert_eq!(
            handle_key(&mut app, key(KeyCode::Enter)),
            Some(UiCommand::Export(PathBuf::from("chat.csv")))
        );

        type_text(&mut app, "/bogus");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.status, "Unknown command: /bogus");

        type_text(&mut app, "/quit");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.should_quit);
    }

    #[test]
    fn select_mode_reactions_and_votes() {
        let (mut app, id) = app_with_bot_message();
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.mode, AppMode::Select);

        assert_eq!(
            handle_key(&mut app, key(KeyCode::Char('3'))),
            Some(UiCommand::React {
                message_id: id.clone(),
                kind: ReactionKind::Heart,
            })
        );
        assert_eq!(handle_key(&mut app, key(KeyCode::Char('7'))), None);
        assert_eq!(
            handle_key(&mut app, key(KeyCode::Char('n'))),
            Some(UiCommand::Helpful {
                message_id: id.clone(),
                helpful: false,
            })
        );
        assert_eq!(
            handle_key(&mut app, key(KeyCode::Char('d'))),
            Some(UiCommand::Delete(id))
        );
    }

    #[test]
    fn select_mode_enter_shows_action_paths() {
        let (mut app, _) = app_with_bot_message();
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.status, "Check Bills -> /student-dashboard/billing");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn typing_in_select_mode_does_not_edit_input() {
        let (mut app, _) = app_with_bot_message();
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.input.is_empty());
    }
}
