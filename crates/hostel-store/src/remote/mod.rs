//! Hosted backend over the REST and auth endpoints.

mod auth;
mod client;

#[cfg(test)]
mod tests;

pub use auth::{AuthClient, AuthTokens, AuthUser, SignUpData};
pub use client::{Order, RemoteBackend, RemoteConfig, RestQuery};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hostel_core::Role;
use hostel_core::chat::{HelpfulnessVote, Reaction};
use hostel_core::records::{
    Bill, BillStatus, MaintenanceRequest, MaintenanceStatus, Notification, Profile,
    ProfileUpdate, ResourceUsage, Room, RoomAssignment, RoomStatus, StudentSettings,
};
use serde_json::json;

use crate::error::{StoreError, StoreResult};
use crate::feed::{ChangeFeed, Table};
use crate::models::ChatRecord;
use crate::store::{ChatStore, RecordStore, Store};

fn by_id(table: Table, id: &str) -> RestQuery {
    RestQuery::new(table).eq("id", id)
}

/// First row of an update, or `NotFound` when nothing matched.
fn first<T>(rows: Vec<T>, what: &str, id: &str) -> StoreResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound(format!("{what} {id}")))
}

#[async_trait]
impl ChatStore for RemoteBackend {
    async fn load_history(&self, user_id: &str, limit: u32) -> StoreResult<Vec<ChatRecord>> {
        let query = RestQuery::new(Table::ChatHistory)
            .eq("user_id", user_id)
            .order("timestamp", Order::Desc)
            .limit(limit);
        let mut records: Vec<ChatRecord> = self.select(&query).await?;
        records.reverse();
        Ok(records)
    }

    async fn insert_chat(&self, record: &ChatRecord) -> StoreResult<()> {
        self.insert(Table::ChatHistory, record).await
    }

    async fn delete_chat(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        let query = by_id(Table::ChatHistory, id).eq("user_id", user_id);
        let deleted: Vec<ChatRecord> = self.delete(&query).await?;
        Ok(!deleted.is_empty())
    }

    async fn upsert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        self.upsert(Table::ChatReactions, reaction, "message_id,user_id")
            .await
    }

    async fn reactions_for(&self, message_ids: &[String]) -> StoreResult<Vec<Reaction>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = RestQuery::new(Table::ChatReactions)
            .in_list("message_id", message_ids)
            .order("created_at", Order::Asc);
        self.select(&query).await
    }

    async fn insert_vote(&self, vote: &HelpfulnessVote) -> StoreResult<()> {
        self.insert(Table::ChatAnalytics, vote).await
    }

    async fn votes_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<HelpfulnessVote>> {
        let query = RestQuery::new(Table::ChatAnalytics)
            .gte("created_at", since.to_rfc3339())
            .order("created_at", Order::Asc);
        self.select(&query).await
    }

    async fn reactions_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reaction>> {
        let query = RestQuery::new(Table::ChatReactions)
            .gte("created_at", since.to_rfc3339())
            .order("created_at", Order::Asc);
        self.select(&query).await
    }
}

#[async_trait]
impl RecordStore for RemoteBackend {
    async fn profile(&self, id: &str) -> StoreResult<Profile> {
        self.select_one(by_id(Table::Profiles, id))
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Profile {id}")))
    }

    async fn profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        self.select_one(RestQuery::new(Table::Profiles).eq("email", email))
            .await
    }

    async fn profiles_by_role(&self, role: Role) -> StoreResult<Vec<Profile>> {
        let query = RestQuery::new(Table::Profiles)
            .eq("role", role)
            .order("name", Order::Asc);
        self.select(&query).await
    }

    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<()> {
        self.upsert(Table::Profiles, profile, "id").await
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Profile> {
        if update.name.is_none() && update.phone.is_none() {
            return RecordStore::profile(self, id).await;
        }
        let rows = self
            .update(&by_id(Table::Profiles, id), &serde_json::to_value(update)?)
            .await?;
        first(rows, "Profile", id)
    }

    async fn set_room_number(&self, id: &str, room_number: Option<&str>) -> StoreResult<()> {
        let rows: Vec<Profile> = self
            .update(
                &by_id(Table::Profiles, id),
                &json!({ "room_number": room_number }),
            )
            .await?;
        first(rows, "Profile", id).map(|_| ())
    }

    async fn rooms(&self) -> StoreResult<Vec<Room>> {
        self.select(&RestQuery::new(Table::Rooms).order("room_number", Order::Asc))
            .await
    }

    async fn room(&self, id: &str) -> StoreResult<Room> {
        self.select_one(by_id(Table::Rooms, id))
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Room {id}")))
    }

    async fn room_by_number(&self, room_number: &str) -> StoreResult<Option<Room>> {
        self.select_one(RestQuery::new(Table::Rooms).eq("room_number", room_number))
            .await
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        self.insert(Table::Rooms, room).await
    }

    async fn update_room(
        &self,
        id: &str,
        occupied: i64,
        status: RoomStatus,
    ) -> StoreResult<Room> {
        let rows = self
            .update(
                &by_id(Table::Rooms, id),
                &json!({ "occupied": occupied, "status": status }),
            )
            .await?;
        first(rows, "Room", id)
    }

    async fn delete_room(&self, id: &str) -> StoreResult<bool> {
        let deleted: Vec<Room> = self.delete(&by_id(Table::Rooms, id)).await?;
        Ok(!deleted.is_empty())
    }

    async fn insert_assignment(&self, assignment: &RoomAssignment) -> StoreResult<()> {
        self.insert(Table::RoomAssignments, assignment).await
    }

    async fn assignment_for(&self, student_id: &str) -> StoreResult<Option<RoomAssignment>> {
        let query = RestQuery::new(Table::RoomAssignments)
            .eq("student_id", student_id)
            .order("assigned_at", Order::Desc);
        self.select_one(query).await
    }

    async fn bills(&self, student_id: Option<&str>) -> StoreResult<Vec<Bill>> {
        let mut query = RestQuery::new(Table::Bills);
        if let Some(student_id) = student_id {
            query = query.eq("student_id", student_id);
        }
        self.select(&query.order("created_at", Order::Desc)).await
    }

    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()> {
        self.insert(Table::Bills, bill).await
    }

    async fn set_bill_status(&self, id: &str, status: BillStatus) -> StoreResult<Bill> {
        let rows = self
            .update(&by_id(Table::Bills, id), &json!({ "status": status }))
            .await?;
        first(rows, "Bill", id)
    }

    async fn maintenance_requests(
        &self,
        student_id: Option<&str>,
    ) -> StoreResult<Vec<MaintenanceRequest>> {
        let mut query = RestQuery::new(Table::MaintenanceRequests);
        if let Some(student_id) = student_id {
            query = query.eq("student_id", student_id);
        }
        self.select(&query.order("created_at", Order::Desc)).await
    }

    async fn insert_maintenance(&self, request: &MaintenanceRequest) -> StoreResult<()> {
        self.insert(Table::MaintenanceRequests, request).await
    }

    async fn set_maintenance_status(
        &self,
        id: &str,
        status: MaintenanceStatus,
    ) -> StoreResult<MaintenanceRequest> {
        let rows = self
            .update(
                &by_id(Table::MaintenanceRequests, id),
                &json!({ "status": status }),
            )
            .await?;
        first(rows, "Maintenance request", id)
    }

    async fn notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        let query = RestQuery::new(Table::Notifications)
            .eq("user_id", user_id)
            .order("created_at", Order::Desc);
        self.select(&query).await
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.insert(Table::Notifications, notification).await
    }

    async fn mark_notification_read(&self, id: &str) -> StoreResult<()> {
        let rows: Vec<Notification> = self
            .update(&by_id(Table::Notifications, id), &json!({ "read": true }))
            .await?;
        first(rows, "Notification", id).map(|_| ())
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> StoreResult<u64> {
        let query = RestQuery::new(Table::Notifications)
            .eq("user_id", user_id)
            .eq("read", false);
        let rows: Vec<Notification> = self.update(&query, &json!({ "read": true })).await?;
        Ok(rows.len() as u64)
    }

    async fn delete_notification(&self, id: &str) -> StoreResult<bool> {
        let deleted: Vec<Notification> = self.delete(&by_id(Table::Notifications, id)).await?;
        Ok(!deleted.is_empty())
    }

    async fn insert_usage(&self, usage: &ResourceUsage) -> StoreResult<()> {
        self.insert(Table::ResourceManagement, usage).await
    }

    async fn usage_history(&self, student_id: &str, limit: u32) -> StoreResult<Vec<ResourceUsage>> {
        let query = RestQuery::new(Table::ResourceManagement)
            .eq("student_id", student_id)
            .order("recorded_at", Order::Desc)
            .limit(limit);
        self.select(&query).await
    }

    async fn settings(&self, user_id: &str) -> StoreResult<Option<StudentSettings>> {
        self.select_one(RestQuery::new(Table::StudentSettings).eq("user_id", user_id))
            .await
    }

    async fn upsert_settings(&self, settings: &StudentSettings) -> StoreResult<()> {
        self.upsert(Table::StudentSettings, settings, "user_id").await
    }
}

impl Store for RemoteBackend {
    fn changes(&self) -> &ChangeFeed {
        self.feed()
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
