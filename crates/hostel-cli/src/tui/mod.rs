//! Two-thread TUI orchestration.
//!
//! Terminal I/O runs on a dedicated OS thread; the chat session and its
//! reply tasks stay on the tokio runtime. Key presses arrive over an mpsc
//! channel and session changes over the session's broadcast channel.

mod input;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use hostel_service::{ChatSession, ReactionRecorder};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::App;
use crate::ui;

pub use input::UiCommand;

/// Terminal events forwarded from the reader thread.
pub enum TermEvent {
    Key(crossterm::event::KeyEvent),
    Resize(u16, u16),
}

/// Run the interactive chat until the user quits.
pub async fn run(session: ChatSession) -> anyhow::Result<()> {
    let auth = session.auth();
    let mut app = App::new(
        auth.role(),
        auth.display_name().unwrap_or(&auth.user.email).to_string(),
    );
    app.session_id = session.session_id().to_string();
    app.user_id = auth.user_id().to_string();
    app.suggestions = session.suggested_replies();
    let mut chat_rx = session.subscribe();
    app.messages = session.messages().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let cancel = CancellationToken::new();
    let (term_tx, mut term_rx) = tokio::sync::mpsc::channel::<TermEvent>(64);

    let reader_cancel = cancel.clone();
    let ui_thread = std::thread::spawn(move || {
        while !reader_cancel.is_cancelled() {
            // Short poll so cancellation is noticed.
            if !event::poll(Duration::from_millis(50)).unwrap_or(false) {
                continue;
            }
            let forwarded = match event::read() {
                // Windows reports Release too.
                Ok(Event::Key(key))
                    if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                {
                    Some(TermEvent::Key(key))
                }
                Ok(Event::Resize(w, h)) => Some(TermEvent::Resize(w, h)),
                _ => None,
            };
            if let Some(ev) = forwarded
                && term_tx.blocking_send(ev).is_err()
            {
                break;
            }
        }
    });

    info!(session_id = %app.session_id, "Chat started");
    let mut tick = tokio::time::interval(Duration::from_millis(50));

    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(e) = terminal.draw(|f| ui::draw(f, &mut app)) {
                    break Err(e.into());
                }
            }
            Some(term_event) = term_rx.recv() => {
                match term_event {
                    TermEvent::Key(key) => {
                        if let Some(cmd) = input::handle_key(&mut app, key) {
                            execute_command(&session, &mut app, cmd).await;
                        }
                    }
                    // Picked up by the next draw.
                    TermEvent::Resize(w, h) => debug!(w, h, "Terminal resized"),
                }
            }
            chat_event = chat_rx.recv() => match chat_event {
                Ok(ev) => app.handle_event(ev),
                Err(RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Chat events lagged; reloading history");
                    app.messages = session.messages().await;
                    app.typing = session.is_typing();
                }
                Err(RecvError::Closed) => break Ok(()),
            },
        }
        if app.should_quit {
            break Ok(());
        }
    };

    cancel.cancel();
    let _ = ui_thread.join();

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();
    info!("Chat closed");

    result
}

/// Run a session command, reporting the outcome in the status bar.
async fn execute_command(session: &ChatSession, app: &mut App, cmd: UiCommand) {
    app.status = match run_command(session, cmd).await {
        Ok(status) => status,
        Err(e) => format!("Error: {e}"),
    };
}

async fn run_command(session: &ChatSession, cmd: UiCommand) -> anyhow::Result<String> {
    Ok(match cmd {
        UiCommand::Send(text) => {
            // The reply arrives as session events.
            session.send_message(&text).await?;
            "Sent".to_string()
        }
        UiCommand::React { message_id, kind } => {
            ReactionRecorder::new(session.clone())
                .react(&message_id, kind)
                .await?;
            format!("Reacted {kind}")
        }
        UiCommand::Helpful {
            message_id,
            helpful,
        } => {
            ReactionRecorder::new(session.clone())
                .mark_helpful(&message_id, helpful)
                .await?;
            "Thanks for the feedback".to_string()
        }
        UiCommand::Delete(message_id) => {
            session.delete_message(&message_id).await?;
            "Message deleted".to_string()
        }
        UiCommand::Export(path) => {
            let file = std::fs::File::create(&path)?;
            session.export_csv(file).await?;
            format!("Exported to {}", path.display())
        }
    })
}
