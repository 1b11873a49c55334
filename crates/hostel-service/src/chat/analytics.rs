//! Admin view over chat feedback.

use chrono::Utc;
use hostel_core::Role;
use hostel_core::assistant::analytics::summarize;
use hostel_core::assistant::{AnalyticsSummary, TimeRange};
use hostel_store::{ChatStore, SharedStore, Store};

use crate::auth::AuthSession;
use crate::error::ServiceResult;

#[derive(Clone)]
pub struct ChatAnalytics {
    store: SharedStore,
}

impl ChatAnalytics {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Votes and reactions within `range`, admins only.
    pub async fn summarize(
        &self,
        auth: &AuthSession,
        range: TimeRange,
    ) -> ServiceResult<AnalyticsSummary> {
        auth.require(Role::Admin)?;
        let since = range.since(Utc::now());
        let votes = self.store.votes_since(since).await?;
        let reactions = self.store.reactions_since(since).await?;
        Ok(summarize(&votes, &reactions))
    }
}

impl std::fmt::Debug for ChatAnalytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatAnalytics")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}
