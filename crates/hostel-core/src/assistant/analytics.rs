//! Aggregation of chat feedback for the admin analytics screen.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::{HelpfulnessVote, Reaction};
use crate::error::Error;

/// Look-back window of the analytics screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    #[default]
    Week,
    Month,
}

impl TimeRange {
    /// Start of the window ending at `now`.
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => now - Duration::days(1),
            Self::Week => now - Duration::days(7),
            Self::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(Error::UnknownVariant {
                kind: "time range",
                value: other.to_string(),
            }),
        }
    }
}

/// Counts shown on the analytics screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    /// Votes per query type, `"unknown"` when the vote carried none.
    pub query_types: BTreeMap<String, u64>,
    pub helpful: u64,
    pub not_helpful: u64,
    /// Reactions per emoji.
    pub reactions: BTreeMap<String, u64>,
    pub active_users: usize,
    pub total_sessions: usize,
}

impl AnalyticsSummary {
    /// Share of helpful votes, `None` when nobody voted.
    #[allow(clippy::cast_precision_loss)]
    pub fn helpfulness_rate(&self) -> Option<f64> {
        let total = self.helpful + self.not_helpful;
        (total > 0).then(|| self.helpful as f64 / total as f64)
    }
}

/// Fold votes and reactions (already filtered to the window) into a summary.
pub fn summarize(votes: &[HelpfulnessVote], reactions: &[Reaction]) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::default();
    let mut users = HashSet::new();
    let mut sessions = HashSet::new();

    for vote in votes {
        let key = vote.query_type.as_deref().unwrap_or("unknown").to_string();
        *summary.query_types.entry(key).or_default() += 1;
        if vote.was_helpful {
            summary.helpful += 1;
        } else {
            summary.not_helpful += 1;
        }
        users.insert(vote.user_id.as_str());
        sessions.insert(vote.session_id.as_str());
    }

    for reaction in reactions {
        *summary
            .reactions
            .entry(reaction.kind.emoji().to_string())
            .or_default() += 1;
    }

    summary.active_users = users.len();
    summary.total_sessions = sessions.len();
    summary
}
