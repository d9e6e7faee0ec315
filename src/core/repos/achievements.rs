// src/core/repos/achievements.rs
use anyhow::Result;
use chrono::Utc;

use crate::app_log;
use crate::core::Database;
use crate::types::career::AchievementRow;
use crate::types::{Achievement, AchievementInput};
use crate::utils::encode_list;

const COLUMNS: &str = "id, user_id, core_task, impact_metric, skills_used, tags, company, role, \
                       year, verification_level, created_at";

pub struct AchievementRepository<'a> {
    db: &'a Database,
}

impl<'a> AchievementRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Achievement>> {
        let sql = format!(
            "SELECT {} FROM achievements WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            COLUMNS
        );
        let rows: Vec<AchievementRow> = self.db.query(&sql, &[user_id.into()]).await?;
        Ok(rows.into_iter().map(Achievement::from).collect())
    }

    pub async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Achievement>> {
        let sql = format!(
            "SELECT {} FROM achievements WHERE id = ? AND user_id = ?",
            COLUMNS
        );
        let row: Option<AchievementRow> =
            self.db.query_one(&sql, &[id.into(), user_id.into()]).await?;
        Ok(row.map(Achievement::from))
    }

    pub async fn create(&self, user_id: i64, input: &AchievementInput) -> Result<Achievement> {
        let outcome = self
            .db
            .execute(
                r#"
                INSERT INTO achievements (user_id, core_task, impact_metric, skills_used, tags,
                                          company, role, year, verification_level, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                &[
                    user_id.into(),
                    input.core_task.trim().into(),
                    input.impact_metric.clone().into(),
                    encode_list(&input.skills_used).into(),
                    encode_list(&input.tags).into(),
                    input.company.clone().into(),
                    input.role.clone().into(),
                    input.year.into(),
                    input.verification_level_or_default().into(),
                    Utc::now().into(),
                ],
            )
            .await?;

        app_log!(
            info,
            "Created achievement {} for user {}",
            outcome.last_insert_id,
            user_id
        );

        self.find_owned(outcome.last_insert_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Achievement {} vanished after insert", outcome.last_insert_id))
    }

    /// `None` when no row with this id belongs to the user.
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: &AchievementInput,
    ) -> Result<Option<Achievement>> {
        if self.find_owned(id, user_id).await?.is_none() {
            return Ok(None);
        }

        self.db
            .execute(
                r#"
                UPDATE achievements SET
                    core_task = ?, impact_metric = ?, skills_used = ?, tags = ?,
                    company = ?, role = ?, year = ?, verification_level = ?
                WHERE id = ? AND user_id = ?
                "#,
                &[
                    input.core_task.trim().into(),
                    input.impact_metric.clone().into(),
                    encode_list(&input.skills_used).into(),
                    encode_list(&input.tags).into(),
                    input.company.clone().into(),
                    input.role.clone().into(),
                    input.year.into(),
                    input.verification_level_or_default().into(),
                    id.into(),
                    user_id.into(),
                ],
            )
            .await?;

        app_log!(info, "Updated achievement {} for user {}", id, user_id);
        self.find_owned(id, user_id).await
    }

    /// `false` when no row with this id belongs to the user.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool> {
        if self.find_owned(id, user_id).await?.is_none() {
            return Ok(false);
        }

        let outcome = self
            .db
            .execute(
                "DELETE FROM achievements WHERE id = ? AND user_id = ?",
                &[id.into(), user_id.into()],
            )
            .await?;

        app_log!(info, "Deleted achievement {} for user {}", id, user_id);
        Ok(outcome.rows_affected > 0)
    }
}
