//! Hostel Desk Services
//!
//! Explicitly constructed services over a [`hostel_store::SharedStore`].
//! Each takes the caller's [`AuthSession`]; role-gated operations refuse
//! callers outside their namespace.

pub mod auth;
pub mod billing;
pub mod chat;
pub mod error;
pub mod maintenance;
pub mod notifications;
pub mod resources;
pub mod rooms;
pub mod settings;

pub use auth::AuthSession;
pub use billing::BillingService;
pub use chat::{ChatAnalytics, ChatEvent, ChatOptions, ChatSession, PendingReply, ReactionRecorder};
pub use error::{ServiceError, ServiceResult};
pub use maintenance::MaintenanceService;
pub use notifications::{NotificationCenter, Notifier};
pub use resources::ResourceService;
pub use rooms::RoomService;
pub use settings::SettingsService;
