//! User notifications.
//!
//! [`Notifier`] writes the event notifications other services emit.
//! [`NotificationCenter`] is one user's inbox, kept current from the change
//! feed.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use hostel_core::Role;
use hostel_core::records::{MaintenanceStatus, NewNotification, Notification, NotificationKind};
use hostel_store::{ChangeFilter, ChangeKind, RecordStore, SharedStore, Store, Table};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Event notifications
// =============================================================================

/// Writes event notifications. Failures are logged and never fail the
/// operation that triggered them.
#[derive(Clone)]
pub struct Notifier {
    store: SharedStore,
}

impl Notifier {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Insert one notification, unread.
    pub async fn create(&self, new: NewNotification) -> ServiceResult<Notification> {
        new.validate()?;
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            kind: new.kind,
            read: false,
            created_at: Utc::now(),
        };
        self.store.insert_notification(&notification).await?;
        Ok(notification)
    }

    async fn send(&self, new: NewNotification) {
        let user_id = new.user_id.clone();
        if let Err(e) = self.create(new).await {
            warn!(%user_id, error = %e, "Failed to create notification");
        }
    }

    pub async fn room_assigned(&self, student_id: &str, room_number: &str) {
        self.send(NewNotification::new(
            student_id,
            "Room Assignment",
            format!("You have been assigned to Room {room_number}"),
            NotificationKind::Success,
        ))
        .await;
    }

    pub async fn bill_created(&self, student_id: &str, amount: f64, due_date: NaiveDate) {
        self.send(NewNotification::new(
            student_id,
            "New Bill Generated",
            format!(
                "A new bill of ${amount} has been generated. Due date: {}",
                due_date.format("%-m/%-d/%Y")
            ),
            NotificationKind::Warning,
        ))
        .await;
    }

    pub async fn payment_received(&self, student_id: &str, amount: f64) {
        self.send(NewNotification::new(
            student_id,
            "Payment Received",
            format!("Your payment of ${amount} has been received and processed."),
            NotificationKind::Success,
        ))
        .await;
    }

    pub async fn maintenance_updated(&self, student_id: &str, status: MaintenanceStatus) {
        self.send(NewNotification::new(
            student_id,
            "Maintenance Request Update",
            format!("Your maintenance request status has been updated to: {status}"),
            NotificationKind::Info,
        ))
        .await;
    }

    /// Tell every admin about a new request.
    pub async fn maintenance_submitted(&self) {
        let admins = match self.store.profiles_by_role(Role::Admin).await {
            Ok(admins) => admins,
            Err(e) => {
                warn!(error = %e, "Failed to look up admins");
                return;
            }
        };
        for admin in admins {
            self.send(NewNotification::new(
                admin.id,
                "New Maintenance Request",
                "A new maintenance request has been submitted.",
                NotificationKind::Info,
            ))
            .await;
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

// =============================================================================
// Inbox
// =============================================================================

/// The signed-in user's notifications, newest first.
#[derive(Clone)]
pub struct NotificationCenter {
    store: SharedStore,
    auth: AuthSession,
    items: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationCenter {
    pub fn new(store: SharedStore, auth: AuthSession) -> Self {
        Self {
            store,
            auth,
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fetch the inbox from storage.
    pub async fn refresh(&self) -> ServiceResult<Vec<Notification>> {
        let fetched = self.store.notifications(self.auth.user_id()).await?;
        (*self.items.write().await).clone_from(&fetched);
        Ok(fetched)
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.items.read().await.clone()
    }

    pub async fn unread_count(&self) -> usize {
        self.items.read().await.iter().filter(|n| !n.read).count()
    }

    pub async fn mark_read(&self, id: &str) -> ServiceResult<()> {
        self.own(id).await?;
        self.store.mark_notification_read(id).await?;
        if let Some(n) = self.items.write().await.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
        Ok(())
    }

    /// Returns how many were unread.
    pub async fn mark_all_read(&self) -> ServiceResult<u64> {
        let changed = self
            .store
            .mark_all_notifications_read(self.auth.user_id())
            .await?;
        for n in self.items.write().await.iter_mut() {
            n.read = true;
        }
        debug!(changed, "Marked all notifications read");
        Ok(changed)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.own(id).await?;
        self.store.delete_notification(id).await?;
        self.items.write().await.retain(|n| n.id != id);
        Ok(())
    }

    async fn own(&self, id: &str) -> ServiceResult<()> {
        if self.items.read().await.iter().any(|n| n.id == id) {
            return Ok(());
        }
        // Not loaded yet; check storage before refusing.
        let owned = self.refresh().await?.iter().any(|n| n.id == id);
        if owned {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("Notification {id}")))
        }
    }

    /// Follow inserts addressed to this user and put them at the front of the inbox.
    ///
    /// Runs until the feed closes; abort the handle to stop earlier.
    pub fn follow(&self) -> JoinHandle<()> {
        let mut sub = self.store.changes().subscribe(
            ChangeFilter::table(Table::Notifications).eq("user_id", self.auth.user_id()),
        );
        let items = Arc::clone(&self.items);
        tokio::spawn(async move {
            while let Some(change) = sub.recv().await {
                if change.kind != ChangeKind::Insert {
                    continue;
                }
                match change.decode::<Notification>() {
                    Ok(notification) => {
                        let mut items = items.write().await;
                        if !items.iter().any(|n| n.id == notification.id) {
                            items.insert(0, notification);
                        }
                    }
                    Err(e) => warn!(error = %e, "Undecodable notification change"),
                }
            }
            debug!("Notification feed closed");
        })
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("user_id", &self.auth.user_id())
            .finish_non_exhaustive()
    }
}
