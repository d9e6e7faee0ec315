// src/core/repos/applications.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::app_log;
use crate::core::Database;
use crate::types::{Application, ApplicationInput, ApplicationStatus};

const COLUMNS: &str = "id, user_id, job_title, company, job_url, job_description, status, \
                       match_score, notes, applied_at, created_at, updated_at";

pub struct ApplicationRepository<'a> {
    db: &'a Database,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Newest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            COLUMNS
        );
        self.db.query(&sql, &[user_id.into()]).await
    }

    pub async fn find_owned(&self, id: i64, user_id: i64) -> Result<Option<Application>> {
        let sql = format!(
            "SELECT {} FROM applications WHERE id = ? AND user_id = ?",
            COLUMNS
        );
        self.db.query_one(&sql, &[id.into(), user_id.into()]).await
    }

    pub async fn create(&self, user_id: i64, input: &ApplicationInput) -> Result<Application> {
        let now = Utc::now();
        let applied_at = applied_at_after(None, None, input.status, now);

        let outcome = self
            .db
            .execute(
                r#"
                INSERT INTO applications (user_id, job_title, company, job_url, job_description,
                                          status, match_score, notes, applied_at,
                                          created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                &[
                    user_id.into(),
                    input.job_title.clone().into(),
                    input.company.clone().into(),
                    input.job_url.clone().into(),
                    input.job_description.clone().into(),
                    input.status.as_str().into(),
                    input.match_score.into(),
                    input.notes.clone().into(),
                    applied_at.into(),
                    now.into(),
                    now.into(),
                ],
            )
            .await?;

        app_log!(
            info,
            "Created application {} ({}) for user {}",
            outcome.last_insert_id,
            input.status,
            user_id
        );

        self.find_owned(outcome.last_insert_id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Application {} vanished after insert", outcome.last_insert_id))
    }

    /// Replace every field. `applied_at` is stamped only on a transition into
    /// `applied`. `None` when no row with this id belongs to the user.
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        input: &ApplicationInput,
    ) -> Result<Option<Application>> {
        let Some(existing) = self.find_owned(id, user_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let applied_at = applied_at_after(Some(existing.status), existing.applied_at, input.status, now);

        self.db
            .execute(
                r#"
                UPDATE applications SET
                    job_title = ?, company = ?, job_url = ?, job_description = ?,
                    status = ?, match_score = ?, notes = ?, applied_at = ?,
                    updated_at = ?
                WHERE id = ? AND user_id = ?
                "#,
                &[
                    input.job_title.clone().into(),
                    input.company.clone().into(),
                    input.job_url.clone().into(),
                    input.job_description.clone().into(),
                    input.status.as_str().into(),
                    input.match_score.into(),
                    input.notes.clone().into(),
                    applied_at.into(),
                    now.into(),
                    id.into(),
                    user_id.into(),
                ],
            )
            .await?;

        if existing.status != input.status {
            app_log!(
                info,
                "Application {} moved {} -> {} for user {}",
                id,
                existing.status,
                input.status,
                user_id
            );
        }

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
                "DELETE FROM applications WHERE id = ? AND user_id = ?",
                &[id.into(), user_id.into()],
            )
            .await?;

        app_log!(info, "Deleted application {} for user {}", id, user_id);
        Ok(outcome.rows_affected > 0)
    }
}

/// `applied_at` after moving from `previous` (None on creation) to `next`.
fn applied_at_after(
    previous: Option<ApplicationStatus>,
    current: Option<DateTime<Utc>>,
    next: ApplicationStatus,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let entering_applied =
        next == ApplicationStatus::Applied && previous != Some(ApplicationStatus::Applied);
    if entering_applied {
        Some(now)
    } else {
        current
    }
}
