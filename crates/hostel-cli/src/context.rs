//! Backend selection and session resumption shared by every command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use hostel_core::Config;
use hostel_core::config::BackendKind;
use hostel_service::AuthSession;
use hostel_service::auth::resume_remote;
use hostel_store::{Database, RemoteBackend, RemoteConfig, SharedStore};
use tracing::{debug, warn};

use crate::session_file::SessionFile;

/// Remote connection settings from config. Fails when the url or key is missing.
pub fn remote_config(config: &Config) -> anyhow::Result<RemoteConfig> {
    config.validate()?;
    Ok(RemoteConfig {
        url: config.backend.url.clone().unwrap_or_default(),
        anon_key: config.backend.anon_key.clone().unwrap_or_default(),
        timeout: Duration::from_secs(config.backend.request_timeout_secs),
    })
}

fn sqlite_path(config: &Config) -> anyhow::Result<PathBuf> {
    config
        .backend
        .database_path
        .clone()
        .or_else(hostel_core::config::database_path)
        .ok_or_else(|| anyhow::anyhow!("Cannot determine database path; set HOSTEL_DB_PATH"))
}

/// Open the local database, creating it on first use.
pub async fn open_sqlite(config: &Config) -> anyhow::Result<SharedStore> {
    let path = sqlite_path(config)?;
    let db = Database::open(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    debug!(path = %path.display(), "Local database opened");
    Ok(Arc::new(db))
}

/// Store plus signed-in user for commands that need both.
pub struct Signed {
    pub store: SharedStore,
    pub auth: AuthSession,
}

impl std::fmt::Debug for Signed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signed")
            .field("user_id", &self.auth.user_id())
            .finish_non_exhaustive()
    }
}

/// Resume the saved session against the configured backend.
///
/// An expired remote token clears the saved session and asks for a new login.
pub async fn signed_in(config: &Config) -> anyhow::Result<Signed> {
    let mut file = SessionFile::load();
    let saved = file
        .session
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `hostel auth login`."))?;

    if saved.backend != config.backend.kind {
        anyhow::bail!(
            "Logged in to the {:?} backend but {:?} is configured. Log in again.",
            saved.backend,
            config.backend.kind
        );
    }

    match config.backend.kind {
        BackendKind::Remote => {
            let remote = remote_config(config)?;
            match resume_remote(&remote, &saved.user_id, &saved.access_token).await {
                Ok((auth, backend)) => Ok(Signed {
                    store: shared_remote(backend),
                    auth,
                }),
                Err(e) if e.is_auth() => {
                    warn!(error = %e, "Saved session rejected");
                    file.clear();
                    if let Err(e) = file.save() {
                        warn!(error = %e, "Failed to clear saved session");
                    }
                    anyhow::bail!("Session expired. Please log in again.")
                }
                Err(e) => Err(e.into()),
            }
        }
        BackendKind::Sqlite => {
            let store = open_sqlite(config).await?;
            let user = store.profile(&saved.user_id).await?;
            Ok(Signed {
                store,
                auth: AuthSession::new(user, saved.access_token),
            })
        }
    }
}

pub fn shared_remote(backend: RemoteBackend) -> SharedStore {
    Arc::new(backend)
}
