//! Row change feed.
//!
//! Every write performed through a backend is published here as a
//! [`RowChange`]. Subscribers narrow the stream by table and an optional
//! `column = value` predicate, the way realtime channels are filtered on the
//! hosted platform.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

/// Tables of the hosted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Rooms,
    RoomAssignments,
    Bills,
    MaintenanceRequests,
    Notifications,
    ResourceManagement,
    StudentSettings,
    ChatHistory,
    ChatReactions,
    ChatAnalytics,
}

impl Table {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Rooms => "rooms",
            Self::RoomAssignments => "room_assignments",
            Self::Bills => "bills",
            Self::MaintenanceRequests => "maintenance_requests",
            Self::Notifications => "notifications",
            Self::ResourceManagement => "resource_management",
            Self::StudentSettings => "student_settings",
            Self::ChatHistory => "chat_history",
            Self::ChatReactions => "chat_reactions",
            Self::ChatAnalytics => "chat_analytics",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One written row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowChange {
    pub table: Table,
    pub kind: ChangeKind,
    /// The row after the write (before it, for deletes).
    pub row: serde_json::Value,
}

impl RowChange {
    /// Decode the row into a record type.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.row)
    }
}

/// Which changes a subscriber wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub table: Table,
    pub column: Option<(String, String)>,
}

impl ChangeFilter {
    pub const fn table(table: Table) -> Self {
        Self { table, column: None }
    }

    /// Only rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.column = Some((column.into(), value.into()));
        self
    }

    pub fn matches(&self, change: &RowChange) -> bool {
        if change.table != self.table {
            return false;
        }
        let Some((column, value)) = &self.column else {
            return true;
        };
        match change.row.get(column) {
            Some(serde_json::Value::String(s)) => s == value,
            Some(serde_json::Value::Null) | None => false,
            Some(other) => other.to_string() == *value,
        }
    }
}

/// Broadcast hub for row changes. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<RowChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, change: RowChange) {
        let _ = self.tx.send(change);
    }

    /// Serialize `row` and publish it; rows that fail to serialize are logged and skipped.
    pub fn publish_row<T: Serialize>(&self, table: Table, kind: ChangeKind, row: &T) {
        match serde_json::to_value(row) {
            Ok(row) => self.publish(RowChange { table, kind, row }),
            Err(e) => warn!(%table, error = %e, "Failed to serialize row change"),
        }
    }

    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeSubscription {
        ChangeSubscription {
            rx: self.tx.subscribe(),
            filter,
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A filtered receiver.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: broadcast::Receiver<RowChange>,
    filter: ChangeFilter,
}

impl ChangeSubscription {
    /// Next matching change, or `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<RowChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) if self.filter.matches(&change) => return Some(change),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(
                        table = %self.filter.table,
                        skipped = n,
                        "Change subscriber lagged, skipped events"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<RowChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) if self.filter.matches(&change) => return Some(change),
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(table = %self.filter.table, skipped = n, "Change subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(table: Table, row: serde_json::Value) -> RowChange {
        RowChange {
            table,
            kind: ChangeKind::Insert,
            row,
        }
    }

    #[test]
    fn filter_by_table_and_column() {
        let filter = ChangeFilter::table(Table::Notifications).eq("user_id", "u1");
        assert!(filter.matches(&change(Table::Notifications, json!({"user_id": "u1"}))));
        assert!(!filter.matches(&change(Table::Notifications, json!({"user_id": "u2"}))));
        assert!(!filter.matches(&change(Table::Bills, json!({"user_id": "u1"}))));
        assert!(!filter.matches(&change(Table::Notifications, json!({}))));
    }

    #[test]
    fn non_string_columns_compare_by_text() {
        let filter = ChangeFilter::table(Table::Notifications).eq("read", "false");
        assert!(filter.matches(&change(Table::Notifications, json!({"read": false}))));
    }

    #[tokio::test]
    async fn subscriber_skips_unmatched_changes() {
        let feed = ChangeFeed::new(16);
        let mut sub = feed.subscribe(ChangeFilter::table(Table::Bills).eq("student_id", "s1"));

        feed.publish(change(Table::Rooms, json!({"id": "r1"})));
        feed.publish(change(Table::Bills, json!({"student_id": "s2"})));
        feed.publish(change(Table::Bills, json!({"student_id": "s1", "id": "b1"})));

        let got = sub.recv().await.unwrap();
        assert_eq!(got.row["id"], "b1");
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let feed = ChangeFeed::default();
        feed.publish_row(Table::Rooms, ChangeKind::Delete, &json!({"id": "r1"}));
        assert_eq!(feed.receiver_count(), 0);
    }

    #[test]
    fn table_names_match_schema() {
        assert_eq!(Table::ResourceManagement.as_str(), "resource_management");
        assert_eq!(
            serde_json::to_string(&Table::ChatAnalytics).unwrap(),
            "\"chat_analytics\""
        );
    }
}
