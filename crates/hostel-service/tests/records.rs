//! Room, billing, maintenance, resource, notification and settings services.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use hostel_core::Role;
use hostel_core::records::{
    BillStatus, MaintenanceKind, MaintenanceStatus, NewBill, NewMaintenanceRequest, NewRoom,
    NewUsage, Priority, Profile, ProfileUpdate, RoomStatus, StudentSettingsFlags,
};
use hostel_core::resources::UsageStatus;
use hostel_service::{
    AuthSession, BillingService, MaintenanceService, NotificationCenter, ResourceService,
    RoomService, ServiceError, SettingsService,
};
use hostel_store::{Database, RecordStore, SharedStore};

struct Fixture {
    store: SharedStore,
    admin: AuthSession,
    student: AuthSession,
}

fn profile(id: &str, role: Role) -> Profile {
    Profile {
        id: id.into(),
        email: format!("{id}@hostel.test"),
        name: id.to_uppercase(),
        role,
        national_id: None,
        phone: None,
        room_number: None,
    }
}

async fn fixture() -> Fixture {
    let store: SharedStore = Arc::new(Database::open_in_memory().await.unwrap());
    let admin = profile("admin1", Role::Admin);
    let student = profile("stu1", Role::Student);
    store.upsert_profile(&admin).await.unwrap();
    store.upsert_profile(&student).await.unwrap();
    Fixture {
        store,
        admin: AuthSession::new(admin, "local".into()),
        student: AuthSession::new(student, "local".into()),
    }
}

fn is_forbidden(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Core(hostel_core::Error::Forbidden(_)))
}

fn is_validation(err: &ServiceError) -> bool {
    matches!(err, ServiceError::Core(hostel_core::Error::Validation(_)))
}

async fn room_with_capacity(f: &Fixture, number: &str, capacity: i64) {
    RoomService::new(f.store.clone())
        .create(
            &f.admin,
            NewRoom {
                room_number: number.into(),
                block: "A".into(),
                capacity,
            },
        )
        .await
        .unwrap();
}

// === Rooms ===

#[tokio::test]
async fn assigning_last_bed_marks_room_occupied_and_notifies() {
    let f = fixture().await;
    room_with_capacity(&f, "A-101", 1).await;
    let rooms = RoomService::new(f.store.clone());

    rooms.assign(&f.admin, "stu1", "A-101").await.unwrap();

    let room = f.store.room_by_number("A-101").await.unwrap().unwrap();
    assert_eq!(room.occupied, 1);
    assert_eq!(room.status, RoomStatus::Occupied);
    assert_eq!(
        f.store.profile("stu1").await.unwrap().room_number.as_deref(),
        Some("A-101")
    );
    assert_eq!(rooms.my_room(&f.student).await.unwrap().unwrap().id, room.id);

    let inbox = NotificationCenter::new(f.store.clone(), f.student.clone());
    let notes = inbox.refresh().await.unwrap();
    assert_eq!(notes[0].message, "You have been assigned to Room A-101");
}

#[tokio::test]
async fn full_or_closed_rooms_reject_assignment() {
    let f = fixture().await;
    room_with_capacity(&f, "A-101", 1).await;
    room_with_capacity(&f, "B-201", 2).await;
    let rooms = RoomService::new(f.store.clone());
    rooms.assign(&f.admin, "stu1", "A-101").await.unwrap();

    let other = profile("stu2", Role::Student);
    f.store.upsert_profile(&other).await.unwrap();
    assert!(is_validation(
        &rooms.assign(&f.admin, "stu2", "A-101").await.unwrap_err()
    ));

    let b = f.store.room_by_number("B-201").await.unwrap().unwrap();
    rooms
        .set_status(&f.admin, &b.id, RoomStatus::Maintenance)
        .await
        .unwrap();
    assert!(is_validation(
        &rooms.assign(&f.admin, "stu2", "B-201").await.unwrap_err()
    ));
}

#[tokio::test]
async fn students_cannot_manage_rooms() {
    let f = fixture().await;
    let err = RoomService::new(f.store.clone())
        .create(
            &f.student,
            NewRoom {
                room_number: "C-1".into(),
                block: "C".into(),
                capacity: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(is_forbidden(&err));
}

// === Billing ===

#[tokio::test]
async fn bill_lifecycle_notifies_student() {
    let f = fixture().await;
    let billing = BillingService::new(f.store.clone());
    let bill = billing
        .create(
            &f.admin,
            NewBill {
                student_id: "stu1".into(),
                amount: 150.0,
                description: "March rent".into(),
                due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            },
        )
        .await
        .unwrap();
    assert_eq!(bill.status, BillStatus::Pending);

    let mine = billing.list(&f.student).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!((BillingService::outstanding(&mine) - 150.0).abs() < f64::EPSILON);

    let paid = billing.mark_paid(&f.admin, &bill.id).await.unwrap();
    assert_eq!(paid.status, BillStatus::Paid);

    let notes = NotificationCenter::new(f.store.clone(), f.student.clone())
        .refresh()
        .await
        .unwrap();
    let messages: Vec<_> = notes.iter().map(|n| n.message.as_str()).collect();
    assert!(messages.contains(&"A new bill of $150 has been generated. Due date: 3/31/2026"));
    assert!(messages.contains(&"Your payment of $150 has been received and processed."));
}

#[tokio::test]
async fn invalid_bill_is_rejected_before_storage() {
    let f = fixture().await;
    let err = BillingService::new(f.store.clone())
        .create(
            &f.admin,
            NewBill {
                student_id: "stu1".into(),
                amount: 0.0,
                description: "Nothing".into(),
                due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            },
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
    assert!(f.store.bills(None).await.unwrap().is_empty());
}

// === Maintenance ===

fn leak() -> NewMaintenanceRequest {
    NewMaintenanceRequest {
        kind: MaintenanceKind::Plumbing,
        description: "Sink is leaking".into(),
        priority: Priority::High,
    }
}

#[tokio::test]
async fn maintenance_needs_an_assigned_room() {
    let f = fixture().await;
    let err = MaintenanceService::new(f.store.clone())
        .submit(&f.student, leak())
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

#[tokio::test]
async fn maintenance_round_trip_notifies_both_sides() {
    let f = fixture().await;
    room_with_capacity(&f, "A-101", 2).await;
    RoomService::new(f.store.clone())
        .assign(&f.admin, "stu1", "A-101")
        .await
        .unwrap();

    let maintenance = MaintenanceService::new(f.store.clone());
    let request = maintenance.submit(&f.student, leak()).await.unwrap();
    assert_eq!(request.status, MaintenanceStatus::Pending);

    let admin_inbox = NotificationCenter::new(f.store.clone(), f.admin.clone());
    admin_inbox.refresh().await.unwrap();
    assert_eq!(admin_inbox.unread_count().await, 1);
    assert_eq!(admin_inbox.list().await[0].title, "New Maintenance Request");

    assert_eq!(maintenance.list(&f.admin).await.unwrap().len(), 1);
    maintenance
        .update_status(&f.admin, &request.id, MaintenanceStatus::InProgress)
        .await
        .unwrap();

    let notes = NotificationCenter::new(f.store.clone(), f.student.clone())
        .refresh()
        .await
        .unwrap();
    assert_eq!(
        notes[0].message,
        "Your maintenance request status has been updated to: in_progress"
    );
}

// === Notifications ===

#[tokio::test]
async fn inbox_marks_and_deletes() {
    let f = fixture().await;
    room_with_capacity(&f, "A-101", 2).await;
    RoomService::new(f.store.clone())
        .assign(&f.admin, "stu1", "A-101")
        .await
        .unwrap();
    BillingService::new(f.store.clone())
        .create(
            &f.admin,
            NewBill {
                student_id: "stu1".into(),
                amount: 20.5,
                description: "Laundry".into(),
                due_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            },
        )
        .await
        .unwrap();

    let inbox = NotificationCenter::new(f.store.clone(), f.student.clone());
    let notes = inbox.refresh().await.unwrap();
    assert_eq!(inbox.unread_count().await, 2);

    inbox.mark_read(&notes[0].id).await.unwrap();
    assert_eq!(inbox.unread_count().await, 1);
    assert_eq!(inbox.mark_all_read().await.unwrap(), 1);
    assert_eq!(inbox.unread_count().await, 0);

    inbox.delete(&notes[1].id).await.unwrap();
    assert_eq!(inbox.list().await.len(), 1);
    assert!(matches!(
        inbox.delete("missing").await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn followed_inbox_receives_new_notifications_first() {
    let f = fixture().await;
    let inbox = NotificationCenter::new(f.store.clone(), f.student.clone());
    let follower = inbox.follow();

    room_with_capacity(&f, "A-101", 2).await;
    RoomService::new(f.store.clone())
        .assign(&f.admin, "stu1", "A-101")
        .await
        .unwrap();

    let mut received = false;
    for _ in 0..50 {
        if inbox.unread_count().await == 1 {
            received = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    follower.abort();
    assert!(received);
    assert_eq!(inbox.list().await[0].title, "Room Assignment");
}

// === Resources ===

#[tokio::test]
async fn usage_is_analyzed_against_previous_reading() {
    let f = fixture().await;
    let resources = ResourceService::new(f.store.clone());

    let (_, first) = resources
        .log_usage(
            &f.student,
            NewUsage {
                water_usage: 4.0,
                electricity_usage: 250.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(first.status, UsageStatus::Normal);

    let (_, second) = resources
        .log_usage(
            &f.student,
            NewUsage {
                water_usage: 8.0,
                electricity_usage: 250.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(second.status, UsageStatus::High);
    assert!(
        second
            .recommendations
            .iter()
            .any(|r| r.starts_with("Water usage increased by 100.0%"))
    );

    assert_eq!(resources.history(&f.student).await.unwrap().len(), 2);
    let latest = resources.latest_analysis(&f.student).await.unwrap().unwrap();
    assert_eq!(latest, second);
}

#[tokio::test]
async fn negative_usage_is_rejected() {
    let f = fixture().await;
    let err = ResourceService::new(f.store.clone())
        .log_usage(
            &f.student,
            NewUsage {
                water_usage: -1.0,
                electricity_usage: 10.0,
            },
        )
        .await
        .unwrap_err();
    assert!(is_validation(&err));
}

// === Settings ===

#[tokio::test]
async fn settings_default_on_and_persist() {
    let f = fixture().await;
    let settings = SettingsService::new(f.store.clone());
    assert_eq!(
        settings.settings(&f.student).await.unwrap().flags,
        StudentSettingsFlags::default()
    );

    let flags = StudentSettingsFlags {
        billing_reminders: false,
        ..StudentSettingsFlags::default()
    };
    settings.save_settings(&f.student, flags).await.unwrap();
    assert!(!settings.settings(&f.student).await.unwrap().flags.billing_reminders);

    let updated = settings
        .update_profile(
            &f.student,
            ProfileUpdate {
                phone: Some("555-0100".into()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    assert_eq!(settings.profile(&f.student).await.unwrap().name, "STU1");
}
