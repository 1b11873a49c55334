//! Saved sign-in.
//!
//! Persists the signed-in user and bearer token to `~/.hostel/session.json`.

use std::path::{Path, PathBuf};

use hostel_core::config::BackendKind;
use serde::{Deserialize, Serialize};

/// The last successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub backend: BackendKind,
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

/// Session file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SavedSession>,
}

impl SessionFile {
    /// `~/.hostel/`.
    pub fn dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".hostel"))
    }

    /// `~/.hostel/session.json`.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("session.json"))
    }

    /// Load from the default location. Missing or unreadable files mean signed out.
    pub fn load() -> Self {
        Self::path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.session = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn saved() -> SavedSession {
        SavedSession {
            backend: BackendKind::Remote,
            user_id: "u1".into(),
            email: "asha@hostel.test".into(),
            access_token: "at".into(),
        }
    }

    #[test]
    fn default_is_signed_out() {
        assert!(SessionFile::default().session.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let file = SessionFile {
            session: Some(saved()),
        };
        file.save_to(&path).unwrap();
        assert_eq!(SessionFile::load_from(&path), file);
    }

    #[test]
    fn garbage_file_loads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(SessionFile::load_from(&path).session.is_none());
    }

    #[test]
    fn clear_forgets_credentials() {
        let mut file = SessionFile {
            session: Some(saved()),
        };
        file.clear();
        assert_eq!(serde_json::to_string(&file).unwrap(), "{}");
    }

    #[test]
    fn path_lives_under_dot_hostel() {
        if let Some(path) = SessionFile::path() {
            assert!(path.to_string_lossy().contains(".hostel"));
            assert!(path.ends_with("session.json"));
        }
    }
}
