//! Auth subcommands: login, register, logout, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use hostel_core::config::BackendKind;
use hostel_core::records::Profile;
use hostel_core::{Config, Role};
use hostel_service::auth::{sign_in_local, sign_in_remote, sign_out_remote};
use hostel_store::{AuthClient, SignUpData};

use crate::context::{open_sqlite, remote_config};
use crate::session_file::{SavedSession, SessionFile};

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in with email and password.
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (ignored by the local backend).
        #[arg(short, long, env = "HOSTEL_PASSWORD", default_value = "")]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "HOSTEL_PASSWORD", default_value = "")]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        national_id: Option<String>,
        #[arg(long)]
        room_number: Option<String>,
        /// Role for local accounts; hosted sign-up always creates students.
        #[arg(long, default_value = "student")]
        role: Role,
    },
    /// Sign out and forget the saved session.
    Logout,
    /// Show who is signed in.
    Status,
}

/// Execute an auth subcommand.
pub async fn run(action: AuthAction, config: &Config) -> anyhow::Result<()> {
    match action {
        AuthAction::Login { email, password } => login(config, &email, &password).await,
        AuthAction::Register {
            email,
            password,
            name,
            national_id,
            room_number,
            role,
        } => {
            let data = SignUpData {
                name,
                national_id,
                room_number,
            };
            register(config, &email, &password, data, role).await
        }
        AuthAction::Logout => logout(config).await,
        AuthAction::Status => {
            status();
            Ok(())
        }
    }
}

async fn login(config: &Config, email: &str, password: &str) -> anyhow::Result<()> {
    let session = match config.backend.kind {
        BackendKind::Remote => {
            if password.is_empty() {
                anyhow::bail!("Password is required");
            }
            sign_in_remote(&remote_config(config)?, email, password)
                .await?
                .0
        }
        BackendKind::Sqlite => {
            let store = open_sqlite(config).await?;
            sign_in_local(&store, email).await?
        }
    };

    let file = SessionFile {
        session: Some(SavedSession {
            backend: config.backend.kind,
            user_id: session.user_id().to_string(),
            email: session.user.email.clone(),
            access_token: session.access_token.clone(),
        }),
    };
    file.save()?;

    let mut out = io::stdout();
    writeln!(
        out,
        "Logged in as {} ({})",
        session.user.email,
        session.role()
    )?;
    Ok(())
}

async fn register(
    config: &Config,
    email: &str,
    password: &str,
    data: SignUpData,
    role: Role,
) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match config.backend.kind {
        BackendKind::Remote => {
            if role != Role::Student {
                anyhow::bail!("Only student accounts can be registered");
            }
            if password.is_empty() {
                anyhow::bail!("Password is required");
            }
            let user = AuthClient::new(&remote_config(config)?)?
                .sign_up(email, password, &data)
                .await?;
            writeln!(out, "Registered {} ({})", email, user.id)?;
            writeln!(out, "Confirm your email, then run `hostel auth login`.")?;
        }
        BackendKind::Sqlite => {
            let store = open_sqlite(config).await?;
            if store.profile_by_email(email).await?.is_some() {
                anyhow::bail!("{email} is already registered");
            }
            let profile = Profile {
                id: uuid::Uuid::new_v4().to_string(),
                email: email.to_string(),
                name: data.name,
                role,
                national_id: data.national_id,
                phone: None,
                room_number: data.room_number,
            };
            store.upsert_profile(&profile).await?;
            writeln!(out, "Registered {} as {}", email, role)?;
        }
    }
    Ok(())
}

async fn logout(config: &Config) -> anyhow::Result<()> {
    let mut file = SessionFile::load();
    if let Some(saved) = &file.session
        && saved.backend == BackendKind::Remote
        && let Ok(remote) = remote_config(config)
    {
        sign_out_remote(&remote, &saved.access_token).await;
    }
    file.clear();
    file.save()?;
    let mut out = io::stdout();
    writeln!(out, "Logged out")?;
    Ok(())
}

fn status() {
    let mut out = io::stdout();
    match SessionFile::load().session {
        Some(saved) => {
            let _ = writeln!(out, "Logged in as: {}", saved.email);
            let _ = writeln!(out, "User ID:      {}", saved.user_id);
            let _ = writeln!(out, "Backend:      {:?}", saved.backend);
        }
        None => {
            let _ = writeln!(out, "Not logged in");
        }
    }
}
