//! Water and electricity readings.

use chrono::{Datelike, Utc};
use hostel_core::Role;
use hostel_core::records::{NewUsage, ResourceUsage};
use hostel_core::resources::{UsageAnalysis, analyze};
use hostel_store::{RecordStore, SharedStore, Store};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::ServiceResult;

/// Readings kept for charts and trend checks.
pub const HISTORY_LEN: u32 = 6;

#[derive(Clone)]
pub struct ResourceService {
    store: SharedStore,
}

impl ResourceService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Record a reading for the caller and analyze it against the previous one.
    pub async fn log_usage(
        &self,
        auth: &AuthSession,
        usage: NewUsage,
    ) -> ServiceResult<(ResourceUsage, UsageAnalysis)> {
        auth.require(Role::Student)?;
        usage.validate()?;

        let previous = self
            .store
            .usage_history(auth.user_id(), 1)
            .await?
            .into_iter()
            .next();

        let reading = ResourceUsage {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: auth.user_id().to_string(),
            water_usage: usage.water_usage,
            electricity_usage: usage.electricity_usage,
            recorded_at: Utc::now(),
        };
        self.store.insert_usage(&reading).await?;

        let analysis = analyze(
            reading.water_usage,
            reading.electricity_usage,
            previous.as_ref(),
            reading.recorded_at.month(),
        );
        info!(
            water = reading.water_usage,
            electricity = reading.electricity_usage,
            status = %analysis.status,
            score = analysis.efficiency_score,
            "Usage recorded"
        );
        Ok((reading, analysis))
    }

    /// The caller's latest readings, newest first.
    pub async fn history(&self, auth: &AuthSession) -> ServiceResult<Vec<ResourceUsage>> {
        Ok(self
            .store
            .usage_history(auth.user_id(), HISTORY_LEN)
            .await?)
    }

    /// Analysis of the latest reading, `None` before the first one.
    pub async fn latest_analysis(&self, auth: &AuthSession) -> ServiceResult<Option<UsageAnalysis>> {
        let history = self.store.usage_history(auth.user_id(), 2).await?;
        Ok(history.first().map(|latest| {
            analyze(
                latest.water_usage,
                latest.electricity_usage,
                history.get(1),
                latest.recorded_at.month(),
            )
        }))
    }
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
