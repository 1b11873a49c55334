//! Store traits implemented by both backends.
//!
//! Services hold an `Arc<dyn Store>` and never know which backend is behind
//! it. Every write is also published on [`Store::changes`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostel_core::Role;
use hostel_core::chat::{HelpfulnessVote, Reaction};
use hostel_core::records::{
    Bill, BillStatus, MaintenanceRequest, MaintenanceStatus, Notification, Profile,
    ProfileUpdate, ResourceUsage, Room, RoomAssignment, RoomStatus, StudentSettings,
};

use crate::error::StoreResult;
use crate::feed::ChangeFeed;
use crate::models::ChatRecord;

/// Chat history, reactions and helpfulness votes.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// The most recent `limit` messages of a user, oldest first.
    async fn load_history(&self, user_id: &str, limit: u32) -> StoreResult<Vec<ChatRecord>>;

    async fn insert_chat(&self, record: &ChatRecord) -> StoreResult<()>;

    /// Returns `false` when no row had that id.
    /// Delete one of `user_id`'s messages. Other users' rows are never matched.
    async fn delete_chat(&self, user_id: &str, id: &str) -> StoreResult<bool>;

    /// Insert or replace the reaction keyed by (message, user).
    async fn upsert_reaction(&self, reaction: &Reaction) -> StoreResult<()>;

    async fn reactions_for(&self, message_ids: &[String]) -> StoreResult<Vec<Reaction>>;

    /// Append a vote. Votes are never deduplicated.
    async fn insert_vote(&self, vote: &HelpfulnessVote) -> StoreResult<()>;

    async fn votes_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<HelpfulnessVote>>;

    async fn reactions_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reaction>>;
}

/// Hostel records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Profiles
    async fn profile(&self, id: &str) -> StoreResult<Profile>;
    async fn profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>>;
    async fn profiles_by_role(&self, role: Role) -> StoreResult<Vec<Profile>>;
    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<()>;
    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Profile>;
    async fn set_room_number(&self, id: &str, room_number: Option<&str>) -> StoreResult<()>;

    // Rooms
    /// Ordered by room number.
    async fn rooms(&self) -> StoreResult<Vec<Room>>;
    async fn room(&self, id: &str) -> StoreResult<Room>;
    async fn room_by_number(&self, room_number: &str) -> StoreResult<Option<Room>>;
    async fn insert_room(&self, room: &Room) -> StoreResult<()>;
    async fn update_room(&self, id: &str, occupied: i64, status: RoomStatus)
    -> StoreResult<Room>;
    async fn delete_room(&self, id: &str) -> StoreResult<bool>;

    // Assignments
    async fn insert_assignment(&self, assignment: &RoomAssignment) -> StoreResult<()>;
    /// Latest assignment of a student.
    async fn assignment_for(&self, student_id: &str) -> StoreResult<Option<RoomAssignment>>;

    // Bills
    /// Newest first; all students when `student_id` is `None`.
    async fn bills(&self, student_id: Option<&str>) -> StoreResult<Vec<Bill>>;
    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()>;
    async fn set_bill_status(&self, id: &str, status: BillStatus) -> StoreResult<Bill>;

    // Maintenance
    /// Newest first; all students when `student_id` is `None`.
    async fn maintenance_requests(
        &self,
        student_id: Option<&str>,
    ) -> StoreResult<Vec<MaintenanceRequest>>;
    async fn insert_maintenance(&self, request: &MaintenanceRequest) -> StoreResult<()>;
    async fn set_maintenance_status(
        &self,
        id: &str,
        status: MaintenanceStatus,
    ) -> StoreResult<MaintenanceRequest>;

    // Notifications
    /// Newest first.
    async fn notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>>;
    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;
    async fn mark_notification_read(&self, id: &str) -> StoreResult<()>;
    /// Returns how many rows changed.
    async fn mark_all_notifications_read(&self, user_id: &str) -> StoreResult<u64>;
    async fn delete_notification(&self, id: &str) -> StoreResult<bool>;

    // Resource usage
    async fn insert_usage(&self, usage: &ResourceUsage) -> StoreResult<()>;
    /// Newest first.
    async fn usage_history(&self, student_id: &str, limit: u32)
    -> StoreResult<Vec<ResourceUsage>>;

    // Settings
    async fn settings(&self, user_id: &str) -> StoreResult<Option<StudentSettings>>;
    async fn upsert_settings(&self, settings: &StudentSettings) -> StoreResult<()>;
}

/// A complete backend.
pub trait Store: ChatStore + RecordStore {
    /// Changes written through this backend.
    fn changes(&self) -> &ChangeFeed;

    /// Short name for logs.
    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn Store>;
