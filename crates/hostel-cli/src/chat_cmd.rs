//! Non-interactive chat commands.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};
use std::path::PathBuf;

use hostel_core::Config;
use hostel_core::assistant::TimeRange;
use hostel_core::chat::ReactionKind;
use hostel_service::{ChatAnalytics, ChatOptions, ChatSession, ReactionRecorder};

use crate::context::Signed;
use crate::fmt;

#[derive(clap::Subcommand, Debug)]
pub enum HistoryAction {
    /// Print the saved conversation.
    Show {
        /// Only messages containing this text (case-insensitive).
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Write the conversation as CSV.
    Export {
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete one message.
    Delete { message_id: String },
    /// React to a message: up, down, heart, smile, think.
    React {
        message_id: String,
        reaction: ReactionKind,
    },
    /// Tell the assistant whether a reply helped.
    Helpful {
        message_id: String,
        #[arg(action = clap::ArgAction::Set)]
        helpful: bool,
    },
}

async fn open(ctx: &Signed, config: &Config) -> ChatSession {
    let options = ChatOptions::from(&config.assistant).instant();
    ChatSession::open(ctx.store.clone(), ctx.auth.clone(), options).await
}

/// Ask a single question and print the reply.
pub async fn ask(text: &str, ctx: &Signed, config: &Config) -> anyhow::Result<()> {
    let session = open(ctx, config).await;
    let reply = session.send_message(text).await?.wait().await?;
    let mut out = io::stdout();
    writeln!(out, "{}", reply.text)?;
    for action in &reply.actions {
        writeln!(
            out,
            "  [{}] {}",
            action.label,
            action.route.path(ctx.auth.role())
        )?;
    }
    Ok(())
}

pub async fn history(action: HistoryAction, ctx: &Signed, config: &Config) -> anyhow::Result<()> {
    let session = open(ctx, config).await;
    let mut out = io::stdout();
    match action {
        HistoryAction::Show { search } => {
            let messages = match search {
                Some(q) => session.search(&q).await,
                None => session.messages().await,
            };
            if messages.is_empty() {
                writeln!(out, "No messages")?;
            }
            for msg in &messages {
                fmt::write_message(&mut out, msg)?;
                writeln!(out, "    id: {}", msg.id)?;
            }
        }
        HistoryAction::Export { output } => match output {
            Some(path) => {
                let file = std::fs::File::create(&path)?;
                session.export_csv(file).await?;
                writeln!(out, "Exported to {}", path.display())?;
            }
            None => session.export_csv(io::stdout()).await?,
        },
        HistoryAction::Delete { message_id } => {
            session.delete_message(&message_id).await?;
            writeln!(out, "Message deleted")?;
        }
        HistoryAction::React {
            message_id,
            reaction,
        } => {
            let msg = ReactionRecorder::new(session)
                .react(&message_id, reaction)
                .await?;
            fmt::write_message(&mut out, &msg)?;
        }
        HistoryAction::Helpful {
            message_id,
            helpful,
        } => {
            ReactionRecorder::new(session)
                .mark_helpful(&message_id, helpful)
                .await?;
            writeln!(out, "Thanks for the feedback")?;
        }
    }
    Ok(())
}

/// Feedback summary for admins.
pub async fn analytics(range: TimeRange, ctx: &Signed) -> anyhow::Result<()> {
    let summary = ChatAnalytics::new(ctx.store.clone())
        .summarize(&ctx.auth, range)
        .await?;
    fmt::write_summary(&mut io::stdout(), &summary)?;
    Ok(())
}
