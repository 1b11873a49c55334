//! Chat assistant data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::route::Route;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed reaction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum ReactionKind {
    #[serde(rename = "👍")]
    #[sqlx(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "👎")]
    #[sqlx(rename = "👎")]
    ThumbsDown,
    #[serde(rename = "❤️")]
    #[sqlx(rename = "❤️")]
    Heart,
    #[serde(rename = "😊")]
    #[sqlx(rename = "😊")]
    Smile,
    #[serde(rename = "🤔")]
    #[sqlx(rename = "🤔")]
    Thinking,
}

impl ReactionKind {
    pub const ALL: [Self; 5] = [
        Self::ThumbsUp,
        Self::ThumbsDown,
        Self::Heart,
        Self::Smile,
        Self::Thinking,
    ];

    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::ThumbsUp => "👍",
            Self::ThumbsDown => "👎",
            Self::Heart => "❤️",
            Self::Smile => "😊",
            Self::Thinking => "🤔",
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.emoji())
    }
}

/// Accepts the emoji itself or a typed alias (`up`, `down`, `heart`, `smile`, `think`).
impl std::str::FromStr for ReactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(kind) = Self::ALL.into_iter().find(|k| k.emoji() == s) {
            return Ok(kind);
        }
        match s.to_ascii_lowercase().as_str() {
            "up" | "+1" | "thumbsup" => Ok(Self::ThumbsUp),
            "down" | "-1" | "thumbsdown" => Ok(Self::ThumbsDown),
            "heart" | "love" | "❤" => Ok(Self::Heart),
            "smile" => Ok(Self::Smile),
            "think" | "thinking" => Ok(Self::Thinking),
            _ => Err(Error::UnknownVariant {
                kind: "reaction",
                value: s.to_string(),
            }),
        }
    }
}

/// A labeled shortcut offered alongside a bot reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub label: String,
    pub route: Route,
}

impl SuggestedAction {
    pub fn new(label: impl Into<String>, route: Route) -> Self {
        Self {
            label: label.into(),
            route,
        }
    }
}

/// A reaction left by one user on one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reaction {
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    #[serde(rename = "reaction")]
    #[sqlx(rename = "reaction")]
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

/// A helpfulness vote, appended to the analytics log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HelpfulnessVote {
    pub id: String,
    pub user_id: String,
    pub message_id: String,
    pub session_id: String,
    pub was_helpful: bool,
    pub query_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One entry of a chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub actions: Vec<SuggestedAction>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub was_helpful: Option<bool>,
    /// Topic the reply was generated for (bot messages only).
    #[serde(default)]
    pub query_type: Option<String>,
}

impl Message {
    fn new(text: String, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            sender,
            created_at: Utc::now(),
            actions: Vec::new(),
            reactions: Vec::new(),
            was_helpful: None,
            query_type: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), Sender::User)
    }

    pub fn bot(text: impl Into<String>, actions: Vec<SuggestedAction>) -> Self {
        let mut msg = Self::new(text.into(), Sender::Bot);
        msg.actions = actions;
        msg
    }

    #[must_use]
    pub fn with_query_type(mut self, query_type: &str) -> Self {
        self.query_type = Some(query_type.to_string());
        self
    }

    /// Attach a reaction, replacing any earlier one from the same user.
    pub fn apply_reaction(&mut self, reaction: Reaction) {
        self.reactions.retain(|r| r.user_id != reaction.user_id);
        self.reactions.push(reaction);
    }

    pub fn reaction_by(&self, user_id: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.user_id == user_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reaction(user: &str, kind: ReactionKind) -> Reaction {
        Reaction {
            id: uuid::Uuid::new_v4().to_string(),
            message_id: "m1".into(),
            user_id: user.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn second_reaction_from_same_user_replaces_first() {
        let mut msg = Message::bot("hi", Vec::new());
        msg.apply_reaction(reaction("u1", ReactionKind::ThumbsUp));
        msg.apply_reaction(reaction("u2", ReactionKind::Heart));
        msg.apply_reaction(reaction("u1", ReactionKind::ThumbsDown));

        assert_eq!(msg.reactions.len(), 2);
        assert_eq!(msg.reaction_by("u1").unwrap().kind, ReactionKind::ThumbsDown);
        assert_eq!(msg.reaction_by("u2").unwrap().kind, ReactionKind::Heart);
    }

    #[test]
    fn reaction_kind_parses_emoji_and_aliases() {
        assert_eq!("👍".parse::<ReactionKind>().unwrap(), ReactionKind::ThumbsUp);
        assert_eq!("think".parse::<ReactionKind>().unwrap(), ReactionKind::Thinking);
        assert_eq!("❤️".parse::<ReactionKind>().unwrap(), ReactionKind::Heart);
        assert!("🎉".parse::<ReactionKind>().is_err());
    }

    #[test]
    fn reaction_kind_serializes_as_emoji() {
        assert_eq!(
            serde_json::to_string(&ReactionKind::Smile).unwrap(),
            "\"😊\""
        );
    }

    #[test]
    fn new_messages_get_distinct_ids() {
        let a = Message::user("one");
        let b = Message::user("one");
        assert_ne!(a.id, b.id);
        assert_eq!(a.sender, Sender::User);
    }
}
