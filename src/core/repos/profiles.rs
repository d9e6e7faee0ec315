// src/core/repos/profiles.rs
use anyhow::Result;
use chrono::Utc;

use crate::core::database::SqlParam;
use crate::core::Database;
use crate::types::career::{ProfileRow, DEFAULT_BRANDING_COLOR, DEFAULT_BRANDING_FONT};
use crate::types::{Profile, ProfileInput};
use crate::utils::encode_list;

const SELECT_PROFILE: &str = r#"
    SELECT id, user_id, name, email, phone, location, linkedin, website, summary,
           branding_color, branding_font, target_roles, user_values, created_at, updated_at
    FROM profiles
    WHERE user_id = ?
"#;

pub struct ProfileRepository<'a> {
    db: &'a Database,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<Profile>> {
        let row: Option<ProfileRow> = self.db.query_one(SELECT_PROFILE, &[user_id.into()]).await?;
        Ok(row.map(Profile::from))
    }

    /// Empty profile created alongside the account.
    pub async fn create_default(&self, user_id: i64, email: &str) -> Result<()> {
        let now = Utc::now();
        self.db
            .execute(
                r#"
                INSERT INTO profiles (user_id, email, branding_color, branding_font,
                                      target_roles, user_values, created_at, updated_at)
                VALUES (?, ?, ?, ?, '[]', '[]', ?, ?)
                "#,
                &[
                    user_id.into(),
                    email.into(),
                    DEFAULT_BRANDING_COLOR.into(),
                    DEFAULT_BRANDING_FONT.into(),
                    now.into(),
                    now.into(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Replace every field. Returns `None` when the user has no profile row.
    pub async fn replace(&self, user_id: i64, input: &ProfileInput) -> Result<Option<Profile>> {
        let params: Vec<SqlParam> = vec![
            input.name.clone().into(),
            input.email.clone().into(),
            input.phone.clone().into(),
            input.location.clone().into(),
            input.linkedin.clone().into(),
            input.website.clone().into(),
            input.summary.clone().into(),
            input.branding_color.clone().into(),
            input.branding_font.clone().into(),
            encode_list(&input.target_roles).into(),
            encode_list(&input.values).into(),
            Utc::now().into(),
            user_id.into(),
        ];

        let outcome = self
            .db
            .execute(
                r#"
                UPDATE profiles SET
                    name = ?, email = ?, phone = ?, location = ?,
                    linkedin = ?, website = ?, summary = ?,
                    branding_color = ?, branding_font = ?,
                    target_roles = ?, user_values = ?,
                    updated_at = ?
                WHERE user_id = ?
                "#,
                &params,
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repos::test_support::db_with_users;

    fn input() -> ProfileInput {
        serde_json::from_value(serde_json::json!({
            "name": "Jane Doe",
            "summary": "Backend engineer",
            "target_roles": ["Staff Engineer", "Tech Lead"],
            "values": ["Ownership", "Craft"]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_default_profile_is_empty() {
        let (db, ids) = db_with_users(&["jane@example.com"]).await;
        let repo = ProfileRepository::new(&db);
        repo.create_default(ids[0], "jane@example.com").await.unwrap();

        let profile = repo.find_by_user(ids[0]).await.unwrap().unwrap();
        assert_eq!(profile.email.as_deref(), Some("jane@example.com"));
        assert_eq!(profile.branding_color.as_deref(), Some("#000000"));
        assert_eq!(profile.branding_font.as_deref(), Some("Inter"));
        assert!(profile.target_roles.is_empty());
        assert!(profile.values.is_empty());
    }

    #[tokio::test]
    async fn test_replace_round_trips_lists() {
        let (db, ids) = db_with_users(&["jane@example.com"]).await;
        let repo = ProfileRepository::new(&db);
        repo.create_default(ids[0], "jane@example.com").await.unwrap();

        let updated = repo.replace(ids[0], &input()).await.unwrap().unwrap();
        assert_eq!(updated.name.as_deref(), Some("Jane Doe"));
        assert_eq!(updated.target_roles, vec!["Staff Engineer", "Tech Lead"]);
        assert_eq!(updated.values, vec!["Ownership", "Craft"]);
        // Fields absent from the body are cleared.
        assert_eq!(updated.email, None);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_replace_without_profile_returns_none() {
        let (db, ids) = db_with_users(&["jane@example.com"]).await;
        let repo = ProfileRepository::new(&db);
        assert!(repo.replace(ids[0], &input()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_list_column_reads_as_empty() {
        let (db, ids) = db_with_users(&["jane@example.com"]).await;
        let repo = ProfileRepository::new(&db);
        repo.create_default(ids[0], "jane@example.com").await.unwrap();
        db.execute(
            "UPDATE profiles SET target_roles = '[broken', user_values = NULL WHERE user_id = ?",
            &[ids[0].into()],
        )
        .await
        .unwrap();

        let profile = repo.find_by_user(ids[0]).await.unwrap().unwrap();
        assert!(profile.target_roles.is_empty());
        assert!(profile.values.is_empty());
    }
}
