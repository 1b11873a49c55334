//! Hostel records: rooms, assignments, bills, maintenance tickets,
//! notifications, resource usage, profiles and settings.
//!
//! Field names match the remote table columns so the same types decode both
//! REST payloads and sqlite rows. The `New*` inputs carry the required-field
//! checks run before anything is submitted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::role::Role;

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

// =============================================================================
// Profiles
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub room_number: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            required("name", name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentSettingsFlags {
    pub email_notifications: bool,
    pub maintenance_updates: bool,
    pub billing_reminders: bool,
}

impl Default for StudentSettingsFlags {
    fn default() -> Self {
        Self {
            email_notifications: true,
            maintenance_updates: true,
            billing_reminders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentSettings {
    pub user_id: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub flags: StudentSettingsFlags,
}

// =============================================================================
// Rooms
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    #[serde(alias = "full")]
    Occupied,
    Maintenance,
}

impl RoomStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(Self::Available),
            "occupied" | "full" => Ok(Self::Occupied),
            "maintenance" => Ok(Self::Maintenance),
            other => Err(Error::UnknownVariant {
                kind: "room status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub block: String,
    pub capacity: i64,
    pub occupied: i64,
    pub status: RoomStatus,
}

impl Room {
    pub const fn has_space(&self) -> bool {
        self.occupied < self.capacity
    }

    /// Whether a new student can be placed here.
    pub fn accepts_assignment(&self) -> Result<()> {
        if self.status == RoomStatus::Maintenance {
            return Err(Error::validation(format!(
                "room {} is under maintenance",
                self.room_number
            )));
        }
        if !self.has_space() {
            return Err(Error::validation(format!("room {} is full", self.room_number)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    pub block: String,
    pub capacity: i64,
}

impl NewRoom {
    pub fn validate(&self) -> Result<()> {
        required("room_number", &self.room_number)?;
        required("block", &self.block)?;
        if self.capacity <= 0 {
            return Err(Error::validation("capacity must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RoomAssignment {
    pub id: String,
    pub student_id: String,
    pub room_id: String,
    pub assigned_at: DateTime<Utc>,
}

// =============================================================================
// Bills
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Paid,
}

impl BillStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bill {
    pub id: String,
    pub student_id: String,
    pub amount: f64,
    pub description: String,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBill {
    pub student_id: String,
    pub amount: f64,
    pub description: String,
    pub due_date: NaiveDate,
}

impl NewBill {
    pub fn validate(&self) -> Result<()> {
        required("student_id", &self.student_id)?;
        required("description", &self.description)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::validation("amount must be a positive number"));
        }
        Ok(())
    }
}

// =============================================================================
// Maintenance
// =============================================================================

/// Issue categories offered by the request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum MaintenanceKind {
    #[serde(rename = "Plumbing Issue")]
    #[sqlx(rename = "Plumbing Issue")]
    Plumbing,
    #[serde(rename = "Electrical Problem")]
    #[sqlx(rename = "Electrical Problem")]
    Electrical,
    #[serde(rename = "Furniture Repair")]
    #[sqlx(rename = "Furniture Repair")]
    Furniture,
    #[serde(rename = "Air Conditioning")]
    #[sqlx(rename = "Air Conditioning")]
    AirConditioning,
    #[serde(rename = "Heating System")]
    #[sqlx(rename = "Heating System")]
    Heating,
    #[serde(rename = "Lock/Key Issue")]
    #[sqlx(rename = "Lock/Key Issue")]
    LockKey,
    #[serde(rename = "Pest Control")]
    #[sqlx(rename = "Pest Control")]
    PestControl,
    #[serde(rename = "Cleaning Service")]
    #[sqlx(rename = "Cleaning Service")]
    Cleaning,
    #[serde(rename = "Internet/Network Issue")]
    #[sqlx(rename = "Internet/Network Issue")]
    Internet,
    #[serde(rename = "Other")]
    #[sqlx(rename = "Other")]
    Other,
}

impl MaintenanceKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing Issue",
            Self::Electrical => "Electrical Problem",
            Self::Furniture => "Furniture Repair",
            Self::AirConditioning => "Air Conditioning",
            Self::Heating => "Heating System",
            Self::LockKey => "Lock/Key Issue",
            Self::PestControl => "Pest Control",
            Self::Cleaning => "Cleaning Service",
            Self::Internet => "Internet/Network Issue",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Short names for the command line (`plumbing`, `electrical`, ...).
impl std::str::FromStr for MaintenanceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plumbing" => Ok(Self::Plumbing),
            "electrical" => Ok(Self::Electrical),
            "furniture" => Ok(Self::Furniture),
            "ac" | "air-conditioning" => Ok(Self::AirConditioning),
            "heating" => Ok(Self::Heating),
            "lock" | "key" => Ok(Self::LockKey),
            "pest" | "pest-control" => Ok(Self::PestControl),
            "cleaning" => Ok(Self::Cleaning),
            "internet" | "network" => Ok(Self::Internet),
            "other" => Ok(Self::Other),
            other => Err(Error::UnknownVariant {
                kind: "maintenance type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl std::str::FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(Error::UnknownVariant {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    #[serde(alias = "in-progress")]
    InProgress,
    Completed,
}

impl MaintenanceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaintenanceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(Error::UnknownVariant {
                kind: "maintenance status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceRequest {
    pub id: String,
    pub student_id: String,
    pub room_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: MaintenanceKind,
    pub description: String,
    pub priority: Priority,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaintenanceRequest {
    pub kind: MaintenanceKind,
    pub description: String,
    pub priority: Priority,
}

impl NewMaintenanceRequest {
    pub fn validate(&self) -> Result<()> {
        required("description", &self.description)
    }
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<()> {
        required("user_id", &self.user_id)?;
        required("title", &self.title)
    }
}

// =============================================================================
// Resource usage
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceUsage {
    pub id: String,
    pub student_id: String,
    /// Cubic metres for the month.
    pub water_usage: f64,
    /// Kilowatt-hours for the month.
    pub electricity_usage: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewUsage {
    pub water_usage: f64,
    pub electricity_usage: f64,
}

impl NewUsage {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("water_usage", self.water_usage),
            ("electricity_usage", self.electricity_usage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::validation(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn room(status: RoomStatus, capacity: i64, occupied: i64) -> Room {
        Room {
            id: "r1".into(),
            room_number: "A-101".into(),
            block: "A".into(),
            capacity,
            occupied,
            status,
        }
    }

    #[test]
    fn full_or_maintenance_rooms_reject_assignment() {
        assert!(room(RoomStatus::Available, 2, 1).accepts_assignment().is_ok());
        assert!(room(RoomStatus::Available, 2, 2).accepts_assignment().is_err());
        assert!(room(RoomStatus::Maintenance, 2, 0).accepts_assignment().is_err());
    }

    #[test]
    fn bill_requires_positive_amount_and_description() {
        let mut bill = NewBill {
            student_id: "s1".into(),
            amount: 120.0,
            description: "March rent".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        };
        assert!(bill.validate().is_ok());

        bill.amount = 0.0;
        assert!(matches!(bill.validate(), Err(Error::Validation(_))));

        bill.amount = f64::NAN;
        assert!(bill.validate().is_err());

        bill.amount = 10.0;
        bill.description = "   ".into();
        assert!(bill.validate().is_err());
    }

    #[test]
    fn maintenance_status_accepts_hyphenated_legacy_value() {
        let status: MaintenanceStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(status, MaintenanceStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&MaintenanceStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }

    #[test]
    fn room_status_full_alias() {
        let status: RoomStatus = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(status, RoomStatus::Occupied);
    }

    #[test]
    fn maintenance_request_decodes_remote_row() {
        let json = r#"{
            "id": "m1", "student_id": "s1", "room_id": "r1",
            "type": "Lock/Key Issue", "description": "Door stuck",
            "priority": "urgent", "status": "pending",
            "created_at": "2026-01-05T10:00:00Z"
        }"#;
        let req: MaintenanceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind, MaintenanceKind::LockKey);
        assert_eq!(req.priority, Priority::Urgent);
    }

    #[test]
    fn settings_flatten_round_trip() {
        let settings = StudentSettings {
            user_id: "u1".into(),
            flags: StudentSettingsFlags::default(),
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["billing_reminders"], true);
        assert_eq!(value["user_id"], "u1");
    }

    #[test]
    fn usage_rejects_negative_values() {
        assert!(NewUsage { water_usage: 4.0, electricity_usage: 250.0 }.validate().is_ok());
        assert!(NewUsage { water_usage: -1.0, electricity_usage: 250.0 }.validate().is_err());
    }

    #[test]
    fn maintenance_kind_short_names() {
        assert_eq!("AC".parse::<MaintenanceKind>().unwrap(), MaintenanceKind::AirConditioning);
        assert!("volcano".parse::<MaintenanceKind>().is_err());
    }
}
