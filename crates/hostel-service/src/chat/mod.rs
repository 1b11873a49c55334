//! Chat assistant sessions, feedback and analytics.

pub mod analytics;
pub mod feedback;
pub mod session;

pub use analytics::ChatAnalytics;
pub use feedback::ReactionRecorder;
pub use session::{ChatEvent, ChatOptions, ChatSession, PendingReply};
