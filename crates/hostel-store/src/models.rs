//! Row types that differ from their domain counterparts.

use chrono::{DateTime, Utc};
use hostel_core::chat::{Message, Sender, SuggestedAction};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// A `chat_history` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatRecord {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub actions: Option<Json<Vec<SuggestedAction>>>,
    #[serde(default)]
    pub query_type: Option<String>,
}

impl ChatRecord {
    pub fn from_message(user_id: &str, msg: &Message) -> Self {
        Self {
            id: msg.id.clone(),
            user_id: user_id.to_string(),
            message: msg.text.clone(),
            sender: msg.sender,
            timestamp: msg.created_at,
            actions: (!msg.actions.is_empty()).then(|| Json(msg.actions.clone())),
            query_type: msg.query_type.clone(),
        }
    }

    /// Rebuild the message; reactions are attached separately.
    pub fn into_message(self) -> Message {
        Message {
            id: self.id,
            text: self.message,
            sender: self.sender,
            created_at: self.timestamp,
            actions: self.actions.map(|Json(a)| a).unwrap_or_default(),
            reactions: Vec::new(),
            was_helpful: None,
            query_type: self.query_type,
        }
    }
}
