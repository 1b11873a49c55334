//! Chat queries: history, reactions, helpfulness votes.

use chrono::{DateTime, Utc};
use hostel_core::chat::{HelpfulnessVote, Reaction};
use hostel_core::db::DatabaseError;
use sqlx::{QueryBuilder, Sqlite};

use super::db::Database;
use crate::feed::{ChangeKind, Table};
use crate::models::ChatRecord;

impl Database {
    // =========================================================================
    // History
    // =========================================================================

    /// The most recent `limit` messages of a user, oldest first.
    pub async fn load_history(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ChatRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, ChatRecord>(
            r"
            SELECT * FROM (
                SELECT * FROM chat_history WHERE user_id = ?
                ORDER BY timestamp DESC LIMIT ?
            ) ORDER BY timestamp ASC
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(records)
    }

    pub async fn insert_chat(&self, record: &ChatRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO chat_history (id, user_id, message, sender, timestamp, actions, query_type)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.message)
        .bind(record.sender)
        .bind(record.timestamp)
        .bind(&record.actions)
        .bind(&record.query_type)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::ChatHistory, ChangeKind::Insert, record);
        Ok(())
    }

    /// Delete one message. Its reactions and votes are left in place.
    pub async fn delete_chat(&self, user_id: &str, id: &str) -> Result<bool, DatabaseError> {
        let deleted = sqlx::query_as::<_, ChatRecord>(
            "DELETE FROM chat_history WHERE id = ? AND user_id = ? RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        let Some(record) = deleted else {
            return Ok(false);
        };
        self.feed()
            .publish_row(Table::ChatHistory, ChangeKind::Delete, &record);
        Ok(true)
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    /// Insert or replace the reaction keyed by (message, user).
    pub async fn upsert_reaction(&self, reaction: &Reaction) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO chat_reactions (id, message_id, user_id, reaction, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(message_id, user_id) DO UPDATE SET reaction = excluded.reaction, \
             created_at = excluded.created_at",
        )
        .bind(&reaction.id)
        .bind(&reaction.message_id)
        .bind(&reaction.user_id)
        .bind(reaction.kind)
        .bind(reaction.created_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::ChatReactions, ChangeKind::Insert, reaction);
        Ok(())
    }

    pub async fn reactions_for(&self, message_ids: &[String]) -> Result<Vec<Reaction>, DatabaseError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM chat_reactions WHERE message_id IN (");
        let mut ids = query.separated(", ");
        for id in message_ids {
            ids.push_bind(id);
        }
        ids.push_unseparated(") ORDER BY created_at ASC");

        let reactions = query
            .build_query_as::<Reaction>()
            .fetch_all(self.pool())
            .await?;

        Ok(reactions)
    }

    pub async fn reactions_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Reaction>, DatabaseError> {
        let reactions = sqlx::query_as::<_, Reaction>(
            "SELECT * FROM chat_reactions WHERE created_at >= ? ORDER BY created_at ASC",
        )
        .bind(since)
        .fetch_all(self.pool())
        .await?;

        Ok(reactions)
    }

    // =========================================================================
    // Helpfulness votes
    // =========================================================================

    pub async fn insert_vote(&self, vote: &HelpfulnessVote) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO chat_analytics
                (id, user_id, message_id, session_id, was_helpful, query_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&vote.id)
        .bind(&vote.user_id)
        .bind(&vote.message_id)
        .bind(&vote.session_id)
        .bind(vote.was_helpful)
        .bind(&vote.query_type)
        .bind(vote.created_at)
        .execute(self.pool())
        .await?;

        self.feed()
            .publish_row(Table::ChatAnalytics, ChangeKind::Insert, vote);
        Ok(())
    }

    pub async fn votes_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<HelpfulnessVote>, DatabaseError> {
        let votes = sqlx::query_as::<_, HelpfulnessVote>(
            "SELECT * FROM chat_analytics WHERE created_at >= ? ORDER BY created_at ASC",
        )
        .bind(since)
        .fetch_all(self.pool())
        .await?;

        Ok(votes)
    }
}
