//! Reactions and helpfulness votes on chat messages.

use chrono::Utc;
use hostel_core::chat::{HelpfulnessVote, Message, Reaction, ReactionKind};
use hostel_store::ChatStore;
use tracing::{debug, info};

use super::session::ChatSession;
use crate::error::{ServiceError, ServiceResult};

/// Records feedback for the messages of one session.
///
/// Storage is written first; the local message changes only once the write
/// succeeded.
#[derive(Debug, Clone)]
pub struct ReactionRecorder {
    session: ChatSession,
}

impl ReactionRecorder {
    pub const fn new(session: ChatSession) -> Self {
        Self { session }
    }

    /// Set the caller's reaction on a message, replacing any earlier one.
    pub async fn react(&self, message_id: &str, kind: ReactionKind) -> ServiceResult<Message> {
        if self.session.message(message_id).await.is_none() {
            return Err(ServiceError::NotFound(format!("Message {message_id}")));
        }

        let reaction = Reaction {
            id: uuid::Uuid::new_v4().to_string(),
            message_id: message_id.to_string(),
            user_id: self.session.auth().user_id().to_string(),
            kind,
            created_at: Utc::now(),
        };
        self.session.store().upsert_reaction(&reaction).await?;
        debug!(message_id, reaction = kind.emoji(), "Reaction saved");

        self.session
            .update_message(message_id, |msg| msg.apply_reaction(reaction))
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("Message {message_id}")))
    }

    /// Record whether a bot answer helped. Every call appends a vote.
    pub async fn mark_helpful(&self, message_id: &str, helpful: bool) -> ServiceResult<Message> {
        let msg = self
            .session
            .message(message_id)
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("Message {message_id}")))?;

        let vote = HelpfulnessVote {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.session.auth().user_id().to_string(),
            message_id: message_id.to_string(),
            session_id: self.session.session_id().to_string(),
            was_helpful: helpful,
            query_type: msg.query_type,
            created_at: Utc::now(),
        };
        self.session.store().insert_vote(&vote).await?;
        info!(message_id, helpful, "Helpfulness recorded");

        self.session
            .update_message(message_id, |m| m.was_helpful = Some(helpful))
            .await
            .ok_or_else(|| ServiceError::NotFound(format!("Message {message_id}")))
    }
}
