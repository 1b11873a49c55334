//! Hostel record queries.

use hostel_core::Role;
use hostel_core::db::DatabaseError;
use hostel_core::records::{
    Bill, BillStatus, MaintenanceRequest, MaintenanceStatus, Notification, Profile,
    ProfileUpdate, ResourceUsage, Room, RoomAssignment, RoomStatus, StudentSettings,
};

use super::db::Database;
use crate::feed::{ChangeKind, Table};

impl Database {
    // =========================================================================
    // Profiles
    // =========================================================================

    pub async fn profile(&self, id: &str) -> Result<Profile, DatabaseError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Profile {id}")))
    }

    pub async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(profile)
    }

    pub async fn profiles_by_role(&self, role: Role) -> Result<Vec<Profile>, DatabaseError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE role = ? ORDER BY name")
                .bind(role)
                .fetch_all(self.pool())
                .await?;

        Ok(profiles)
    }

    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO profiles (id, email, name, role, national_id, phone, room_number) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, name = excluded.name, \
             role = excluded.role, national_id = excluded.national_id, \
             phone = excluded.phone, room_number = excluded.room_number",
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.role)
        .bind(&profile.national_id)
        .bind(&profile.phone)
        .bind(&profile.room_number)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::Profiles, ChangeKind::Update, profile);
        Ok(())
    }

    /// Apply the fields present in `update`.
    pub async fn update_profile(
        &self,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, DatabaseError> {
        let result = sqlx::query(
            "UPDATE profiles SET name = COALESCE(?, name), phone = COALESCE(?, phone) WHERE id = ?",
        )
        .bind(&update.name)
        .bind(&update.phone)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Profile {id}")));
        }

        let profile = self.profile(id).await?;
        self.feed()
            .publish_row(Table::Profiles, ChangeKind::Update, &profile);
        Ok(profile)
    }

    pub async fn set_room_number(
        &self,
        id: &str,
        room_number: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE profiles SET room_number = ? WHERE id = ?")
            .bind(room_number)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Profile {id}")));
        }

        let profile = self.profile(id).await?;
        self.feed()
            .publish_row(Table::Profiles, ChangeKind::Update, &profile);
        Ok(())
    }

    // =========================================================================
    // Rooms
    // =========================================================================

    pub async fn rooms(&self) -> Result<Vec<Room>, DatabaseError> {
        let rooms = sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY room_number")
            .fetch_all(self.pool())
            .await?;

        Ok(rooms)
    }

    pub async fn room(&self, id: &str) -> Result<Room, DatabaseError> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Room {id}")))
    }

    pub async fn room_by_number(&self, room_number: &str) -> Result<Option<Room>, DatabaseError> {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE room_number = ?")
            .bind(room_number)
            .fetch_optional(self.pool())
            .await?;

        Ok(room)
    }

    pub async fn insert_room(&self, room: &Room) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO rooms (id, room_number, block, capacity, occupied, status) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&room.id)
        .bind(&room.room_number)
        .bind(&room.block)
        .bind(room.capacity)
        .bind(room.occupied)
        .bind(room.status)
        .execute(self.pool())
        .await?;

        self.feed().publish_row(Table::Rooms, ChangeKind::Insert, room);
        Ok(())
    }

    pub async fn update_room(
        &self,
        id: &str,
        occupied: i64,
        status: RoomStatus,
    ) -> Result<Room, DatabaseError> {
        let room = sqlx::query_as::<_, Room>(
            "UPDATE rooms SET occupied = ?, status = ? WHERE id = ? RETURNING *",
        )
        .bind(occupied)
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Room {id}")))?;

        self.feed().publish_row(Table::Rooms, ChangeKind::Update, &room);
        Ok(room)
    }

    pub async fn delete_room(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = sqlx::query_as::<_, Room>("DELETE FROM rooms WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        let Some(room) = deleted else {
            return Ok(false);
        };
        self.feed().publish_row(Table::Rooms, ChangeKind::Delete, &room);
        Ok(true)
    }

    // =========================================================================
    // Room assignments
    // =========================================================================

    pub async fn insert_assignment(&self, assignment: &RoomAssignment) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO room_assignments (id, student_id, room_id, assigned_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&assignment.id)
        .bind(&assignment.student_id)
        .bind(&assignment.room_id)
        .bind(assignment.assigned_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::RoomAssignments, ChangeKind::Insert, assignment);
        Ok(())
    }

    pub async fn assignment_for(
        &self,
        student_id: &str,
    ) -> Result<Option<RoomAssignment>, DatabaseError> {
        let assignment = sqlx::query_as::<_, RoomAssignment>(
            "SELECT * FROM room_assignments WHERE student_id = ? ORDER BY assigned_at DESC LIMIT 1",
        )
        .bind(student_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(assignment)
    }

    // =========================================================================
    // Bills
    // =========================================================================

    pub async fn bills(&self, student_id: Option<&str>) -> Result<Vec<Bill>, DatabaseError> {
        let bills = if let Some(student_id) = student_id {
            sqlx::query_as::<_, Bill>(
                "SELECT * FROM bills WHERE student_id = ? ORDER BY created_at DESC",
            )
            .bind(student_id)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Bill>("SELECT * FROM bills ORDER BY created_at DESC")
                .fetch_all(self.pool())
                .await?
        };

        Ok(bills)
    }

    pub async fn insert_bill(&self, bill: &Bill) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO bills (id, student_id, amount, description, due_date, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&bill.id)
        .bind(&bill.student_id)
        .bind(bill.amount)
        .bind(&bill.description)
        .bind(bill.due_date)
        .bind(bill.status)
        .bind(bill.created_at)
        .execute(self.pool())
        .await?;

        self.feed().publish_row(Table::Bills, ChangeKind::Insert, bill);
        Ok(())
    }

    pub async fn set_bill_status(&self, id: &str, status: BillStatus) -> Result<Bill, DatabaseError> {
        let bill = sqlx::query_as::<_, Bill>("UPDATE bills SET status = ? WHERE id = ? RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Bill {id}")))?;

        self.feed().publish_row(Table::Bills, ChangeKind::Update, &bill);
        Ok(bill)
    }

    // =========================================================================
    // Maintenance requests
    // =========================================================================

    pub async fn maintenance_requests(
        &self,
        student_id: Option<&str>,
    ) -> Result<Vec<MaintenanceRequest>, DatabaseError> {
        let requests = if let Some(student_id) = student_id {
            sqlx::query_as::<_, MaintenanceRequest>(
                "SELECT * FROM maintenance_requests WHERE student_id = ? ORDER BY created_at DESC",
            )
            .bind(student_id)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, MaintenanceRequest>(
                "SELECT * FROM maintenance_requests ORDER BY created_at DESC",
            )
            .fetch_all(self.pool())
            .await?
        };

        Ok(requests)
    }

    pub async fn insert_maintenance(&self, request: &MaintenanceRequest) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO maintenance_requests
                (id, student_id, room_id, type, description, priority, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&request.id)
        .bind(&request.student_id)
        .bind(&request.room_id)
        .bind(request.kind)
        .bind(&request.description)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.created_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::MaintenanceRequests, ChangeKind::Insert, request);
        Ok(())
    }

    pub async fn set_maintenance_status(
        &self,
        id: &str,
        status: MaintenanceStatus,
    ) -> Result<MaintenanceRequest, DatabaseError> {
        let request = sqlx::query_as::<_, MaintenanceRequest>(
            "UPDATE maintenance_requests SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Maintenance request {id}")))?;

        self.feed()
            .publish_row(Table::MaintenanceRequests, ChangeKind::Update, &request);
        Ok(request)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub async fn notifications(&self, user_id: &str) -> Result<Vec<Notification>, DatabaseError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(notifications)
    }

    pub async fn insert_notification(&self, notification: &Notification) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, title, message, type, read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::Notifications, ChangeKind::Insert, notification);
        Ok(())
    }

    pub async fn mark_notification_read(&self, id: &str) -> Result<(), DatabaseError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = 1 WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Notification {id}")))?;

        self.feed()
            .publish_row(Table::Notifications, ChangeKind::Update, &notification);
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let updated = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0 RETURNING *",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        for notification in &updated {
            self.feed()
                .publish_row(Table::Notifications, ChangeKind::Update, notification);
        }
        Ok(updated.len() as u64)
    }

    pub async fn delete_notification(&self, id: &str) -> Result<bool, DatabaseError> {
        let deleted = sqlx::query_as::<_, Notification>(
            "DELETE FROM notifications WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(notification) = deleted else {
            return Ok(false);
        };
        self.feed()
            .publish_row(Table::Notifications, ChangeKind::Delete, &notification);
        Ok(true)
    }

    // =========================================================================
    // Resource usage
    // =========================================================================

    pub async fn insert_usage(&self, usage: &ResourceUsage) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO resource_management (id, student_id, water_usage, electricity_usage, recorded_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(&usage.id)
        .bind(&usage.student_id)
        .bind(usage.water_usage)
        .bind(usage.electricity_usage)
        .bind(usage.recorded_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::ResourceManagement, ChangeKind::Insert, usage);
        Ok(())
    }

    pub async fn usage_history(
        &self,
        student_id: &str,
        limit: u32,
    ) -> Result<Vec<ResourceUsage>, DatabaseError> {
        let history = sqlx::query_as::<_, ResourceUsage>(
            "SELECT * FROM resource_management WHERE student_id = ? ORDER BY recorded_at DESC LIMIT ?",
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(history)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self, user_id: &str) -> Result<Option<StudentSettings>, DatabaseError> {
        let settings =
            sqlx::query_as::<_, StudentSettings>("SELECT * FROM student_settings WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(self.pool())
                .await?;

        Ok(settings)
    }

    pub async fn upsert_settings(&self, settings: &StudentSettings) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO student_settings \
             (user_id, email_notifications, maintenance_updates, billing_reminders) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
             email_notifications = excluded.email_notifications, \
             maintenance_updates = excluded.maintenance_updates, \
             billing_reminders = excluded.billing_reminders",
        )
        .bind(&settings.user_id)
        .bind(settings.flags.email_notifications)
        .bind(settings.flags.maintenance_updates)
        .bind(settings.flags.billing_reminders)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::StudentSettings, ChangeKind::Update, settings);
        Ok(())
    }
}
