//! Record subcommands: rooms, bills, maintenance, notifications, usage, profile.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use chrono::NaiveDate;
use hostel_core::records::{
    MaintenanceKind, MaintenanceStatus, NewBill, NewMaintenanceRequest, NewRoom, NewUsage,
    Priority, ProfileUpdate, RoomStatus,
};
use hostel_service::{
    BillingService, MaintenanceService, NotificationCenter, ResourceService, RoomService,
    SettingsService,
};

use crate::context::Signed;
use crate::fmt;

#[derive(clap::Subcommand, Debug)]
pub enum RoomsAction {
    /// List all rooms.
    List,
    /// Show your assigned room.
    Mine,
    /// Add a room (admin).
    Create {
        room_number: String,
        #[arg(short, long)]
        block: String,
        #[arg(short, long, default_value = "2")]
        capacity: i64,
    },
    /// Change a room's status (admin).
    Status { room_id: String, status: RoomStatus },
    /// Remove a room (admin).
    Delete { room_id: String },
    /// Place a student in a room (admin).
    Assign {
        student_id: String,
        room_number: String,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum BillsAction {
    /// Your bills, or everyone's for admins.
    List,
    /// Issue a bill (admin).
    Create {
        student_id: String,
        amount: f64,
        #[arg(short, long)]
        description: String,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: NaiveDate,
    },
    /// Mark a bill paid (admin).
    Pay { bill_id: String },
}

#[derive(clap::Subcommand, Debug)]
pub enum MaintenanceAction {
    /// Your requests, or everyone's for admins.
    List,
    /// File a request for your room.
    Submit {
        /// plumbing, electrical, furniture, ac, heating, lock, pest, cleaning, internet, other.
        kind: MaintenanceKind,
        description: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// Update a request's status (admin).
    Status {
        request_id: String,
        status: MaintenanceStatus,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum NotificationsAction {
    /// Show your notifications, newest first.
    List,
    /// Mark one notification read.
    Read { id: String },
    /// Mark everything read.
    ReadAll,
    /// Delete a notification.
    Delete { id: String },
    /// Print notifications as they arrive.
    Watch,
}

#[derive(clap::Subcommand, Debug)]
pub enum UsageAction {
    /// Record this month's water (m3) and electricity (kWh) readings.
    Log { water: f64, electricity: f64 },
    /// Recent readings.
    History,
    /// Analyze the latest reading.
    Analyze,
}

#[derive(clap::Subcommand, Debug)]
pub enum ProfileAction {
    /// Show your profile and preferences.
    Show,
    /// Change name or phone.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change notification preferences.
    Settings {
        #[arg(long)]
        email_notifications: Option<bool>,
        #[arg(long)]
        maintenance_updates: Option<bool>,
        #[arg(long)]
        billing_reminders: Option<bool>,
    },
}

pub async fn rooms(action: RoomsAction, ctx: &Signed) -> anyhow::Result<()> {
    let service = RoomService::new(ctx.store.clone());
    let mut out = io::stdout();
    match action {
        RoomsAction::List => fmt::write_rooms(&mut out, &service.list().await?)?,
        RoomsAction::Mine => match service.my_room(&ctx.auth).await? {
            Some(room) => fmt::write_rooms(&mut out, &[room])?,
            None => writeln!(
                out,
                "No room has been assigned to you yet. Please contact the administrator."
            )?,
        },
        RoomsAction::Create {
            room_number,
            block,
            capacity,
        } => {
            let room = service
                .create(
                    &ctx.auth,
                    NewRoom {
                        room_number,
                        block,
                        capacity,
                    },
                )
                .await?;
            writeln!(out, "Created room {} ({})", room.room_number, room.id)?;
        }
        RoomsAction::Status { room_id, status } => {
            let room = service.set_status(&ctx.auth, &room_id, status).await?;
            writeln!(out, "Room {} is now {}", room.room_number, room.status)?;
        }
        RoomsAction::Delete { room_id } => {
            service.delete(&ctx.auth, &room_id).await?;
            writeln!(out, "Room deleted")?;
        }
        RoomsAction::Assign {
            student_id,
            room_number,
        } => {
            service.assign(&ctx.auth, &student_id, &room_number).await?;
            writeln!(out, "Student assigned to room {room_number}")?;
        }
    }
    Ok(())
}

pub async fn bills(action: BillsAction, ctx: &Signed) -> anyhow::Result<()> {
    let service = BillingService::new(ctx.store.clone());
    let mut out = io::stdout();
    match action {
        BillsAction::List => {
            let bills = service.list(&ctx.auth).await?;
            fmt::write_bills(&mut out, &bills)?;
            writeln!(out, "Outstanding: ${:.2}", BillingService::outstanding(&bills))?;
        }
        BillsAction::Create {
            student_id,
            amount,
            description,
            due,
        } => {
            let bill = service
                .create(
                    &ctx.auth,
                    NewBill {
                        student_id,
                        amount,
                        description,
                        due_date: due,
                    },
                )
                .await?;
            writeln!(out, "Bill created ({})", bill.id)?;
        }
        BillsAction::Pay { bill_id } => {
            let bill = service.mark_paid(&ctx.auth, &bill_id).await?;
            writeln!(out, "Bill {} marked {}", bill.id, bill.status)?;
        }
    }
    Ok(())
}

pub async fn maintenance(action: MaintenanceAction, ctx: &Signed) -> anyhow::Result<()> {
    let service = MaintenanceService::new(ctx.store.clone());
    let mut out = io::stdout();
    match action {
        MaintenanceAction::List => fmt::write_requests(&mut out, &service.list(&ctx.auth).await?)?,
        MaintenanceAction::Submit {
            kind,
            description,
            priority,
        } => {
            let request = service
                .submit(
                    &ctx.auth,
                    NewMaintenanceRequest {
                        kind,
                        description,
                        priority,
                    },
                )
                .await?;
            writeln!(out, "Maintenance request submitted ({})", request.id)?;
        }
        MaintenanceAction::Status { request_id, status } => {
            service
                .update_status(&ctx.auth, &request_id, status)
                .await?;
            writeln!(out, "Request {request_id} is now {status}")?;
        }
    }
    Ok(())
}

pub async fn notifications(action: NotificationsAction, ctx: &Signed) -> anyhow::Result<()> {
    let center = NotificationCenter::new(ctx.store.clone(), ctx.auth.clone());
    let mut out = io::stdout();
    center.refresh().await?;
    match action {
        NotificationsAction::List => {
            fmt::write_notifications(&mut out, &center.list().await)?;
            writeln!(out, "{} unread", center.unread_count().await)?;
        }
        NotificationsAction::Read { id } => {
            center.mark_read(&id).await?;
            writeln!(out, "Marked read")?;
        }
        NotificationsAction::ReadAll => {
            let n = center.mark_all_read().await?;
            writeln!(out, "Marked {n} read")?;
        }
        NotificationsAction::Delete { id } => {
            center.delete(&id).await?;
            writeln!(out, "Deleted")?;
        }
        NotificationsAction::Watch => watch(&center).await?,
    }
    Ok(())
}

/// Print new notifications until Ctrl+C.
async fn watch(center: &NotificationCenter) -> anyhow::Result<()> {
    let mut out = io::stdout();
    writeln!(out, "Watching for notifications (Ctrl+C to stop)...")?;
    let follower = center.follow();
    let mut seen = center.list().await.len();
    let mut tick = tokio::time::interval(std::time::Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tick.tick() => {
                let items = center.list().await;
                if items.len() > seen {
                    fmt::write_notifications(&mut out, &items[..items.len() - seen])?;
                }
                seen = items.len();
            }
        }
    }
    follower.abort();
    Ok(())
}

pub async fn usage(action: UsageAction, ctx: &Signed) -> anyhow::Result<()> {
    let service = ResourceService::new(ctx.store.clone());
    let mut out = io::stdout();
    match action {
        UsageAction::Log { water, electricity } => {
            let (_, analysis) = service
                .log_usage(
                    &ctx.auth,
                    NewUsage {
                        water_usage: water,
                        electricity_usage: electricity,
                    },
                )
                .await?;
            writeln!(out, "Reading saved")?;
            fmt::write_analysis(&mut out, &analysis)?;
        }
        UsageAction::History => fmt::write_usage(&mut out, &service.history(&ctx.auth).await?)?,
        UsageAction::Analyze => match service.latest_analysis(&ctx.auth).await? {
            Some(analysis) => fmt::write_analysis(&mut out, &analysis)?,
            None => writeln!(out, "No readings yet")?,
        },
    }
    Ok(())
}

pub async fn profile(action: ProfileAction, ctx: &Signed) -> anyhow::Result<()> {
    let service = SettingsService::new(ctx.store.clone());
    let mut out = io::stdout();
    match action {
        ProfileAction::Show => {
            let profile = service.profile(&ctx.auth).await?;
            let settings = service.settings(&ctx.auth).await?;
            writeln!(out, "  Name:     {}", profile.name)?;
            writeln!(out, "  Email:    {}", profile.email)?;
            writeln!(out, "  Role:     {}", profile.role)?;
            if let Some(room) = &profile.room_number {
                writeln!(out, "  Room:     {room}")?;
            }
            if let Some(phone) = &profile.phone {
                writeln!(out, "  Phone:    {phone}")?;
            }
            writeln!(out, "  Email notifications: {}", settings.flags.email_notifications)?;
            writeln!(out, "  Maintenance updates: {}", settings.flags.maintenance_updates)?;
            writeln!(out, "  Billing reminders:   {}", settings.flags.billing_reminders)?;
        }
        ProfileAction::Update { name, phone } => {
            let profile = service
                .update_profile(&ctx.auth, ProfileUpdate { name, phone })
                .await?;
            writeln!(out, "Profile updated for {}", profile.name)?;
        }
        ProfileAction::Settings {
            email_notifications,
            maintenance_updates,
            billing_reminders,
        } => {
            let mut flags = service.settings(&ctx.auth).await?.flags;
            if let Some(v) = email_notifications {
                flags.email_notifications = v;
            }
            if let Some(v) = maintenance_updates {
                flags.maintenance_updates = v;
            }
            if let Some(v) = billing_reminders {
                flags.billing_reminders = v;
            }
            service.save_settings(&ctx.auth, flags).await?;
            writeln!(out, "Settings saved")?;
        }
    }
    Ok(())
}
