// src/core/repos/users.rs
use anyhow::Result;
use chrono::Utc;

use crate::app_log;
use crate::core::Database;
use crate::types::User;

pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.db
            .query_one(
                "SELECT id, email, hashed_password, created_at FROM users WHERE id = ?",
                &[id.into()],
            )
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.db
            .query_one(
                "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?",
                &[email.into()],
            )
            .await
    }

    /// Fails with a UNIQUE violation if the email is taken.
    pub async fn create(&self, email: &str, hashed_password: &str) -> Result<User> {
        let now = Utc::now();
        let outcome = self
            .db
            .execute(
                "INSERT INTO users (email, hashed_password, created_at) VALUES (?, ?, ?)",
                &[email.into(), hashed_password.into(), now.into()],
            )
            .await?;

        app_log!(info, "Created user {} ({})", outcome.last_insert_id, email);

        Ok(User {
            id: outcome.last_insert_id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
        })
    }
}
