//! Rule-based chat assistant.
//!
//! Substring intent matching plus canned, role-aware replies. Everything in
//! here is pure; persistence and timing live in `hostel-service`.

pub mod analytics;
pub mod intent;
pub mod responder;

pub use analytics::{AnalyticsSummary, TimeRange};
pub use intent::{AdminTopic, Intent, classify, classify_admin};
pub use responder::{Reply, greeting, reply_for, respond, suggested_replies};
