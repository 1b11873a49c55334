//! Maintenance tickets.

use chrono::Utc;
use hostel_core::Role;
use hostel_core::records::{MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest};
use hostel_store::{RecordStore, SharedStore, Store};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{ServiceError, ServiceResult};
use crate::notifications::Notifier;

#[derive(Clone)]
pub struct MaintenanceService {
    store: SharedStore,
    notifier: Notifier,
}

impl MaintenanceService {
    pub fn new(store: SharedStore) -> Self {
        let notifier = Notifier::new(store.clone());
        Self { store, notifier }
    }

    /// File a request for the caller's assigned room and alert the admins.
    pub async fn submit(
        &self,
        auth: &AuthSession,
        new: NewMaintenanceRequest,
    ) -> ServiceResult<MaintenanceRequest> {
        auth.require(Role::Student)?;
        new.validate()?;

        let assignment = self
            .store
            .assignment_for(auth.user_id())
            .await?
            .ok_or_else(|| {
                ServiceError::validation("No room assigned. Please contact administration.")
            })?;

        let request = MaintenanceRequest {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: auth.user_id().to_string(),
            room_id: assignment.room_id,
            kind: new.kind,
            description: new.description.trim().to_string(),
            priority: new.priority,
            status: MaintenanceStatus::Pending,
            created_at: Utc::now(),
        };
        self.store.insert_maintenance(&request).await?;
        info!(request_id = %request.id, kind = %request.kind, "Maintenance request submitted");

        self.notifier.maintenance_submitted().await;
        Ok(request)
    }

    /// Students see their own requests; admins see all of them.
    pub async fn list(&self, auth: &AuthSession) -> ServiceResult<Vec<MaintenanceRequest>> {
        let requests = match auth.role() {
            Role::Admin => self.store.maintenance_requests(None).await?,
            Role::Student => self.store.maintenance_requests(Some(auth.user_id())).await?,
        };
        Ok(requests)
    }

    pub async fn update_status(
        &self,
        auth: &AuthSession,
        request_id: &str,
        status: MaintenanceStatus,
    ) -> ServiceResult<MaintenanceRequest> {
        auth.require(Role::Admin)?;
        let request = self.store.set_maintenance_status(request_id, status).await?;
        info!(request_id, %status, "Maintenance status updated");
        self.notifier
            .maintenance_updated(&request.student_id, status)
            .await;
        Ok(request)
    }
}

impl std::fmt::Debug for MaintenanceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceService")
            .field("backend", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
