//! Configuration resolution for Hostel Desk.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/hostel/settings.json)
//! 3. Project config (.hostel/settings.json)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete Hostel Desk configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which persistence backend the services talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted Postgres behind the REST/auth gateway.
    #[default]
    Remote,
    /// Local sqlite file, for offline use.
    Sqlite,
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::Config(format!("unknown backend kind: {other}"))),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Project URL of the hosted backend (e.g. `https://xyz.example.co`).
    pub url: Option<String>,
    /// Public (anon) API key sent as the `apikey` header.
    pub anon_key: Option<String>,
    /// Sqlite file used when `kind = sqlite`.
    pub database_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Remote,
            url: None,
            anon_key: None,
            database_path: None,
            request_timeout_secs: 15,
        }
    }
}

/// Chat assistant tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Lower bound of the simulated typing delay.
    pub typing_delay_min_ms: u64,
    /// Upper bound of the simulated typing delay.
    pub typing_delay_max_ms: u64,
    /// How many messages are reloaded when a session opens.
    pub history_limit: u32,
    /// Capacity of the session event channel.
    pub event_capacity: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            typing_delay_min_ms: 500,
            typing_delay_max_ms: 1500,
            history_limit: 50,
            event_capacity: 256,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Check that the selected backend has what it needs.
    pub fn validate(&self) -> Result<()> {
        if self.assistant.typing_delay_min_ms > self.assistant.typing_delay_max_ms {
            return Err(Error::Config(format!(
                "typing_delay_min_ms ({}) exceeds typing_delay_max_ms ({})",
                self.assistant.typing_delay_min_ms, self.assistant.typing_delay_max_ms
            )));
        }
        if self.backend.kind == BackendKind::Remote {
            if self.backend.url.as_deref().is_none_or(str::is_empty) {
                return Err(Error::Config(
                    "backend.url is required for the remote backend (HOSTEL_URL)".into(),
                ));
            }
            if self.backend.anon_key.as_deref().is_none_or(str::is_empty) {
                return Err(Error::Config(
                    "backend.anon_key is required for the remote backend (HOSTEL_ANON_KEY)".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(project_dir: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path()
        && global_path.exists()
    {
        let global = load_config_file(&global_path)?;
        merge_config(&mut config, global);
    }

    if let Some(dir) = project_dir {
        let project_path = dir.join(".hostel").join("settings.json");
        if project_path.exists() {
            let project = load_config_file(&project_path)?;
            merge_config(&mut config, project);
        }
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    config_home().map(|p| p.join("hostel").join("settings.json"))
}

/// Default location of the local sqlite database.
pub fn database_path() -> Option<PathBuf> {
    config_home().map(|p| p.join("hostel").join("hostel.db"))
}

#[cfg(target_os = "linux")]
fn config_home() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
}

#[cfg(target_os = "macos")]
fn config_home() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join("Library/Application Support"))
}

#[cfg(target_os = "windows")]
fn config_home() -> Option<PathBuf> {
    std::env::var("APPDATA").ok().map(PathBuf::from)
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn config_home() -> Option<PathBuf> {
    None
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.backend.kind = overlay.backend.kind;
    if overlay.backend.url.is_some() {
        base.backend.url = overlay.backend.url;
    }
    if overlay.backend.anon_key.is_some() {
        base.backend.anon_key = overlay.backend.anon_key;
    }
    if overlay.backend.database_path.is_some() {
        base.backend.database_path = overlay.backend.database_path;
    }
    base.backend.request_timeout_secs = overlay.backend.request_timeout_secs;

    base.assistant = overlay.assistant;
    base.logging = overlay.logging;
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("HOSTEL_BACKEND") {
        match val.parse() {
            Ok(kind) => config.backend.kind = kind,
            Err(e) => tracing::warn!(error = %e, "Ignoring HOSTEL_BACKEND"),
        }
    }
    if let Some(val) = var("HOSTEL_URL") {
        config.backend.url = Some(val);
    }
    if let Some(val) = var("HOSTEL_ANON_KEY") {
        config.backend.anon_key = Some(val);
    }
    if let Some(val) = var("HOSTEL_DB_PATH") {
        config.backend.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("HOSTEL_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = var("HOSTEL_LOG_JSON") {
        config.logging.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}
