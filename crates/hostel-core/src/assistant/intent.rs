//! Keyword intent classifier.
//!
//! Rules are tested in order and the first match wins; there is no scoring.

use serde::{Deserialize, Serialize};

/// Coarse topic of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Maintenance,
    Billing,
    Room,
    Dashboard,
    Greeting,
    /// Nothing matched.
    Other,
}

impl Intent {
    pub const ALL: [Self; 6] = [
        Self::Maintenance,
        Self::Billing,
        Self::Room,
        Self::Dashboard,
        Self::Greeting,
        Self::Other,
    ];

    /// Stable name, stored as the analytics `query_type`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Billing => "billing",
            Self::Room => "room",
            Self::Dashboard => "dashboard",
            Self::Greeting => "greeting",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::Maintenance, &["maintenance", "repair"]),
    (Intent::Billing, &["bill", "payment"]),
    (Intent::Room, &["room", "allocation"]),
    (Intent::Dashboard, &["dashboard", "home"]),
    // Plain substring match: "hi" also fires inside words such as "this".
    (Intent::Greeting, &["hello", "hi"]),
];

/// Classify free text. Never fails; unmatched text is [`Intent::Other`].
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map_or(Intent::Other, |(intent, _)| *intent)
}

/// Topic of the admin assistant's two-branch rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTopic {
    Students,
    Maintenance,
    General,
}

impl AdminTopic {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Maintenance => "maintenance",
            Self::General => "general",
        }
    }
}

/// Admin rule: "student" first, then "maintenance", otherwise general.
pub fn classify_admin(text: &str) -> AdminTopic {
    let lower = text.to_lowercase();
    if lower.contains("student") {
        AdminTopic::Students
    } else if lower.contains("maintenance") {
        AdminTopic::Maintenance
    } else {
        AdminTopic::General
    }
}
