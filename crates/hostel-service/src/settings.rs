//! Profile and notification preferences.

use hostel_core::records::{Profile, ProfileUpdate, StudentSettings, StudentSettingsFlags};
use hostel_store::{RecordStore, SharedStore};

use crate::auth::AuthSession;
use crate::error::ServiceResult;

#[derive(Clone)]
pub struct SettingsService {
    store: SharedStore,
}

impl SettingsService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stored preferences, or the defaults (everything on) if none were saved.
    pub async fn settings(&self, auth: &AuthSession) -> ServiceResult<StudentSettings> {
        let stored = self.store.settings(auth.user_id()).await?;
        Ok(stored.unwrap_or_else(|| StudentSettings {
            user_id: auth.user_id().to_string(),
            flags: StudentSettingsFlags::default(),
        }))
    }

    pub async fn save_settings(
        &self,
        auth: &AuthSession,
        flags: StudentSettingsFlags,
    ) -> ServiceResult<StudentSettings> {
        let settings = StudentSettings {
            user_id: auth.user_id().to_string(),
            flags,
        };
        self.store.upsert_settings(&settings).await?;
        Ok(settings)
    }

    pub async fn profile(&self, auth: &AuthSession) -> ServiceResult<Profile> {
        Ok(self.store.profile(auth.user_id()).await?)
    }

    pub async fn update_profile(
        &self,
        auth: &AuthSession,
        update: ProfileUpdate,
    ) -> ServiceResult<Profile> {
        update.validate()?;
        Ok(self.store.update_profile(auth.user_id(), &update).await?)
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService").finish_non_exhaustive()
    }
}
