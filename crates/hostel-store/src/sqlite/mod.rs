//! Local sqlite backend.
//!
//! Mirrors the hosted schema for offline use and serves as the test double
//! for the hosted backend.

mod db;
mod queries_chat;
mod queries_records;


pub use db::Database;

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
use crate::store::{ChatStore, RecordStore, Store};

#[async_trait]
impl ChatStore for Database {
    async fn load_history(&self, user_id: &str, limit: u32) -> StoreResult<Vec<ChatRecord>> {
        Ok(Self::load_history(self, user_id, limit).await?)
    }

    async fn insert_chat(&self, record: &ChatRecord) -> StoreResult<()> {
        Ok(Self::insert_chat(self, record).await?)
    }

    async fn delete_chat(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        Ok(Self::delete_chat(self, user_id, id).await?)
    }

    async fn upsert_reaction(&self, reaction: &Reaction) -> StoreResult<()> {
        Ok(Self::upsert_reaction(self, reaction).await?)
    }

    async fn reactions_for(&self, message_ids: &[String]) -> StoreResult<Vec<Reaction>> {
        Ok(Self::reactions_for(self, message_ids).await?)
    }

    async fn insert_vote(&self, vote: &HelpfulnessVote) -> StoreResult<()> {
        Ok(Self::insert_vote(self, vote).await?)
    }

    async fn votes_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<HelpfulnessVote>> {
        Ok(Self::votes_since(self, since).await?)
    }

    async fn reactions_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<Reaction>> {
        Ok(Self::reactions_since(self, since).await?)
    }
}

#[async_trait]
impl RecordStore for Database {
    async fn profile(&self, id: &str) -> StoreResult<Profile> {
        Ok(Self::profile(self, id).await?)
    }

    async fn profile_by_email(&self, email: &str) -> StoreResult<Option<Profile>> {
        Ok(Self::profile_by_email(self, email).await?)
    }

    async fn profiles_by_role(&self, role: Role) -> StoreResult<Vec<Profile>> {
        Ok(Self::profiles_by_role(self, role).await?)
    }

    async fn upsert_profile(&self, profile: &Profile) -> StoreResult<()> {
        Ok(Self::upsert_profile(self, profile).await?)
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> StoreResult<Profile> {
        Ok(Self::update_profile(self, id, update).await?)
    }

    async fn set_room_number(&self, id: &str, room_number: Option<&str>) -> StoreResult<()> {
        Ok(Self::set_room_number(self, id, room_number).await?)
    }

    async fn rooms(&self) -> StoreResult<Vec<Room>> {
        Ok(Self::rooms(self).await?)
    }

    async fn room(&self, id: &str) -> StoreResult<Room> {
        Ok(Self::room(self, id).await?)
    }

    async fn room_by_number(&self, room_number: &str) -> StoreResult<Option<Room>> {
        Ok(Self::room_by_number(self, room_number).await?)
    }

    async fn insert_room(&self, room: &Room) -> StoreResult<()> {
        Ok(Self::insert_room(self, room).await?)
    }

    async fn update_room(
        &self,
        id: &str,
        occupied: i64,
        status: RoomStatus,
    ) -> StoreResult<Room> {
        Ok(Self::update_room(self, id, occupied, status).await?)
    }

    async fn delete_room(&self, id: &str) -> StoreResult<bool> {
        Ok(Self::delete_room(self, id).await?)
    }

    async fn insert_assignment(&self, assignment: &RoomAssignment) -> StoreResult<()> {
        Ok(Self::insert_assignment(self, assignment).await?)
    }

    async fn assignment_for(&self, student_id: &str) -> StoreResult<Option<RoomAssignment>> {
        Ok(Self::assignment_for(self, student_id).await?)
    }

    async fn bills(&self, student_id: Option<&str>) -> StoreResult<Vec<Bill>> {
        Ok(Self::bills(self, student_id).await?)
    }

    async fn insert_bill(&self, bill: &Bill) -> StoreResult<()> {
        Ok(Self::insert_bill(self, bill).await?)
    }

    async fn set_bill_status(&self, id: &str, status: BillStatus) -> StoreResult<Bill> {
        Ok(Self::set_bill_status(self, id, status).await?)
    }

    async fn maintenance_requests(
        &self,
        student_id: Option<&str>,
    ) -> StoreResult<Vec<MaintenanceRequest>> {
        Ok(Self::maintenance_requests(self, student_id).await?)
    }

    async fn insert_maintenance(&self, request: &MaintenanceRequest) -> StoreResult<()> {
        Ok(Self::insert_maintenance(self, request).await?)
    }

    async fn set_maintenance_status(
        &self,
        id: &str,
        status: MaintenanceStatus,
    ) -> StoreResult<MaintenanceRequest> {
        Ok(Self::set_maintenance_status(self, id, status).await?)
    }

    async fn notifications(&self, user_id: &str) -> StoreResult<Vec<Notification>> {
        Ok(Self::notifications(self, user_id).await?)
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        Ok(Self::insert_notification(self, notification).await?)
    }

    async fn mark_notification_read(&self, id: &str) -> StoreResult<()> {
        Ok(Self::mark_notification_read(self, id).await?)
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> StoreResult<u64> {
        Ok(Self::mark_all_notifications_read(self, user_id).await?)
    }

    async fn delete_notification(&self, id: &str) -> StoreResult<bool> {
        Ok(Self::delete_notification(self, id).await?)
    }

    async fn insert_usage(&self, usage: &ResourceUsage) -> StoreResult<()> {
        Ok(Self::insert_usage(self, usage).await?)
    }

    async fn usage_history(&self, student_id: &str, limit: u32) -> StoreResult<Vec<ResourceUsage>> {
        Ok(Self::usage_history(self, student_id, limit).await?)
    }

    async fn settings(&self, user_id: &str) -> StoreResult<Option<StudentSettings>> {
        Ok(Self::settings(self, user_id).await?)
    }

    async fn upsert_settings(&self, settings: &StudentSettings) -> StoreResult<()> {
        Ok(Self::upsert_settings(self, settings).await?)
    }
}

impl Store for Database {
    fn changes(&self) -> &ChangeFeed {
        self.feed()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
