//! Hostel Desk CLI
//!
//! Manage rooms, bills, maintenance and notifications from the terminal, or
//! chat with the hostel assistant in a full-screen UI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hostel_core::Config;
use hostel_core::assistant::TimeRange;
use hostel_core::config::{BackendKind, load_config};
use hostel_core::tracing_init::{init_tracing, init_tracing_to_file};
use hostel_service::{ChatOptions, ChatSession};
use tracing::info;

use hostel_cli::auth_cmd::{self, AuthAction};
use hostel_cli::chat_cmd::{self, HistoryAction};
use hostel_cli::context::signed_in;
use hostel_cli::records_cmd::{
    self, BillsAction, MaintenanceAction, NotificationsAction, ProfileAction, RoomsAction,
    UsageAction,
};
use hostel_cli::session_file::SessionFile;
use hostel_cli::tui;

#[derive(Parser, Debug)]
#[command(name = "hostel")]
#[command(version, about = "Hostel management from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Persistence backend (remote or sqlite).
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Sqlite database file (implies --backend sqlite).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `hostel_store=trace`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in, register, sign out.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Open the interactive assistant (default).
    Chat,
    /// Ask the assistant one question.
    Ask {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Saved conversation: show, search, export, react.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Assistant feedback summary (admin).
    Analytics {
        /// day, week, or month.
        #[arg(short, long, default_value = "week")]
        range: TimeRange,
    },
    Rooms {
        #[command(subcommand)]
        action: RoomsAction,
    },
    Bills {
        #[command(subcommand)]
        action: BillsAction,
    },
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceAction,
    },
    Notifications {
        #[command(subcommand)]
        action: NotificationsAction,
    },
    /// Water and electricity readings.
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().ok();
    let mut config = load_config(cwd.as_deref())?;
    if let Some(kind) = cli.backend {
        config.backend.kind = kind;
    }
    if let Some(db) = &cli.db {
        config.backend.kind = BackendKind::Sqlite;
        config.backend.database_path = Some(db.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if cli.log_json {
        config.logging.json = true;
    }
    Ok(config)
}

/// The full-screen UI owns the terminal, so its logs go to `~/.hostel/chat.log`.
fn init_chat_logging(config: &Config) -> anyhow::Result<()> {
    let dir = SessionFile::dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("chat.log"))?;
    init_tracing_to_file(&config.logging.level, file);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let command = cli.command.unwrap_or(Command::Chat);

    if matches!(command, Command::Chat) {
        init_chat_logging(&config)?;
    } else {
        init_tracing(&config.logging.level, config.logging.json);
    }
    info!(version = env!("CARGO_PKG_VERSION"), backend = ?config.backend.kind, "Starting hostel CLI");

    match command {
        Command::Auth { action } => auth_cmd::run(action, &config).await,
        Command::Chat => {
            let ctx = signed_in(&config).await?;
            let session =
                ChatSession::open(ctx.store, ctx.auth, ChatOptions::from(&config.assistant)).await;
            tui::run(session).await
        }
        Command::Ask { text } => {
            let ctx = signed_in(&config).await?;
            chat_cmd::ask(&text.join(" "), &ctx, &config).await
        }
        Command::History { action } => {
            let ctx = signed_in(&config).await?;
            chat_cmd::history(action, &ctx, &config).await
        }
        Command::Analytics { range } => {
            let ctx = signed_in(&config).await?;
            chat_cmd::analytics(range, &ctx).await
        }
        Command::Rooms { action } => records_cmd::rooms(action, &signed_in(&config).await?).await,
        Command::Bills { action } => records_cmd::bills(action, &signed_in(&config).await?).await,
        Command::Maintenance { action } => {
            records_cmd::maintenance(action, &signed_in(&config).await?).await
        }
        Command::Notifications { action } => {
            records_cmd::notifications(action, &signed_in(&config).await?).await
        }
        Command::Usage { action } => records_cmd::usage(action, &signed_in(&config).await?).await,
        Command::Profile { action } => {
            records_cmd::profile(action, &signed_in(&config).await?).await
        }
    }
}
