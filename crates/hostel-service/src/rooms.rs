//! Room inventory and student placement.

use chrono::Utc;
use hostel_core::Role;
use hostel_core::records::{NewRoom, Room, RoomAssignment, RoomStatus};
use hostel_store::{RecordStore, SharedStore, Store};
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{ServiceError, ServiceResult};
use crate::notifications::Notifier;

#[derive(Clone)]
pub struct RoomService {
    store: SharedStore,
    notifier: Notifier,
}

impl RoomService {
    pub fn new(store: SharedStore) -> Self {
        let notifier = Notifier::new(store.clone());
        Self { store, notifier }
    }

    /// All rooms, by room number.
    pub async fn list(&self) -> ServiceResult<Vec<Room>> {
        Ok(self.store.rooms().await?)
    }

    pub async fn create(&self, auth: &AuthSession, new: NewRoom) -> ServiceResult<Room> {
        auth.require(Role::Admin)?;
        new.validate()?;
        if self.store.room_by_number(&new.room_number).await?.is_some() {
            return Err(ServiceError::validation(format!(
                "room {} already exists",
                new.room_number
            )));
        }

        let room = Room {
            id: uuid::Uuid::new_v4().to_string(),
            room_number: new.room_number,
            block: new.block,
            capacity: new.capacity,
            occupied: 0,
            status: RoomStatus::Available,
        };
        self.store.insert_room(&room).await?;
        info!(room_number = %room.room_number, "Room created");
        Ok(room)
    }

    pub async fn set_status(
        &self,
        auth: &AuthSession,
        room_id: &str,
        status: RoomStatus,
    ) -> ServiceResult<Room> {
        auth.require(Role::Admin)?;
        let room = self.store.room(room_id).await?;
        Ok(self.store.update_room(room_id, room.occupied, status).await?)
    }

    pub async fn delete(&self, auth: &AuthSession, room_id: &str) -> ServiceResult<()> {
        auth.require(Role::Admin)?;
        if !self.store.delete_room(room_id).await? {
            return Err(ServiceError::NotFound(format!("Room {room_id}")));
        }
        Ok(())
    }

    /// Place a student in a room and tell them.
    ///
    /// The room must be open and have a free bed. The room is marked occupied
    /// once its last bed is taken.
    pub async fn assign(
        &self,
        auth: &AuthSession,
        student_id: &str,
        room_number: &str,
    ) -> ServiceResult<RoomAssignment> {
        auth.require(Role::Admin)?;
        let room = self
            .store
            .room_by_number(room_number)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Room {room_number}")))?;
        room.accepts_assignment()?;

        let student = self.store.profile(student_id).await?;
        if student.role != Role::Student {
            return Err(ServiceError::validation(format!(
                "{} is not a student",
                student.email
            )));
        }

        let assignment = RoomAssignment {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            room_id: room.id.clone(),
            assigned_at: Utc::now(),
        };
        self.store.insert_assignment(&assignment).await?;

        let occupied = room.occupied + 1;
        let status = if occupied >= room.capacity {
            RoomStatus::Occupied
        } else {
            room.status
        };
        self.store.update_room(&room.id, occupied, status).await?;
        self.store
            .set_room_number(student_id, Some(&room.room_number))
            .await?;

        info!(student_id, room_number = %room.room_number, occupied, "Student assigned");
        self.notifier
            .room_assigned(student_id, &room.room_number)
            .await;
        Ok(assignment)
    }

    /// The caller's current room, if assigned.
    pub async fn my_room(&self, auth: &AuthSession) -> ServiceResult<Option<Room>> {
        auth.require(Role::Student)?;
        match self.store.assignment_for(auth.user_id()).await? {
            Some(assignment) => Ok(Some(self.store.room(&assignment.room_id).await?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for RoomService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomService")
            .field("backend", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
