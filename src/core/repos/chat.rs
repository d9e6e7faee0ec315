// src/core/repos/chat.rs
use anyhow::Result;
use chrono::Utc;

use crate::core::Database;
use crate::types::{ChatMessage, ChatRole};

pub struct ChatRepository<'a> {
    db: &'a Database,
}

impl<'a> ChatRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn append(&self, user_id: i64, role: ChatRole, content: &str) -> Result<i64> {
        let outcome = self
            .db
            .execute(
                "INSERT INTO chat_messages (user_id, role, content, created_at) VALUES (?, ?, ?, ?)",
                &[user_id.into(), role.as_str().into(), content.into(), Utc::now().into()],
            )
            .await?;
        Ok(outcome.last_insert_id)
    }

    /// Full log, oldest first.
    pub async fn history(&self, user_id: i64) -> Result<Vec<ChatMessage>> {
        self.db
            .query(
                r#"
                SELECT id, user_id, role, content, created_at
                FROM chat_messages
                WHERE user_id = ?
                ORDER BY created_at ASC, id ASC
                "#,
                &[user_id.into()],
            )
            .await
    }

    /// The `limit` most recent messages, oldest first.
    pub async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<ChatMessage>> {
        self.db
            .query(
                r#"
                SELECT id, user_id, role, content, created_at FROM (
                    SELECT id, user_id, role, content, created_at
                    FROM chat_messages
                    WHERE user_id = ?
                    ORDER BY created_at DESC, id DESC
                    LIMIT ?
                )
                ORDER BY created_at ASC, id ASC
                "#,
                &[user_id.into(), limit.into()],
            )
            .await
    }

    pub async fn clear(&self, user_id: i64) -> Result<u64> {
        let outcome = self
            .db
            .execute("DELETE FROM chat_messages WHERE user_id = ?", &[user_id.into()])
            .await?;
        Ok(outcome.rows_affected)
    }
}
