// src/types/career.rs
//! Records owned by a user, plus the request bodies that create and replace them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{decode_list, null_as_default};

pub const DEFAULT_VERIFICATION_LEVEL: &str = "Medium";
pub const DEFAULT_BRANDING_COLOR: &str = "#000000";
pub const DEFAULT_BRANDING_FONT: &str = "Inter";

// ===== Users =====

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

// ===== Profiles =====

/// Raw `profiles` row; list columns still hold JSON text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub branding_color: Option<String>,
    pub branding_font: Option<String>,
    pub target_roles: Option<String>,
    pub user_values: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
    pub branding_color: Option<String>,
    pub branding_font: Option<String>,
    pub target_roles: Vec<String>,
    pub values: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            target_roles: decode_list(row.target_roles.as_deref()),
            values: decode_list(row.user_values.as_deref()),
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            location: row.location,
            linkedin: row.linkedin,
            website: row.website,
            summary: row.summary,
            branding_color: row.branding_color,
            branding_font: row.branding_font,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_branding_color")]
    pub branding_color: Option<String>,
    #[serde(default = "default_branding_font")]
    pub branding_font: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<String>,
}

fn default_branding_color() -> Option<String> {
    Some(DEFAULT_BRANDING_COLOR.to_string())
}

fn default_branding_font() -> Option<String> {
    Some(DEFAULT_BRANDING_FONT.to_string())
}

// ===== Achievements =====

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AchievementRow {
    pub id: i64,
    pub user_id: i64,
    pub core_task: String,
    pub impact_metric: Option<String>,
    pub skills_used: Option<String>,
    pub tags: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub year: Option<i64>,
    pub verification_level: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: i64,
    pub user_id: i64,
    pub core_task: String,
    pub impact_metric: Option<String>,
    pub skills_used: Vec<String>,
    pub tags: Vec<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub year: Option<i64>,
    pub verification_level: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AchievementRow> for Achievement {
    fn from(row: AchievementRow) -> Self {
        Self {
            skills_used: decode_list(row.skills_used.as_deref()),
            tags: decode_list(row.tags.as_deref()),
            id: row.id,
            user_id: row.user_id,
            core_task: row.core_task,
            impact_metric: row.impact_metric,
            company: row.company,
            role: row.role,
            year: row.year,
            verification_level: row.verification_level,
            created_at: row.created_at,
        }
    }
}

/// Body of achievement create/update, and the draft pulled out of a chat reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementInput {
    pub core_task: String,
    #[serde(default)]
    pub impact_metric: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills_used: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    #[serde(default = "default_verification_level")]
    pub verification_level: Option<String>,
}

impl AchievementInput {
    pub fn verification_level_or_default(&self) -> &str {
        self.verification_level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or(DEFAULT_VERIFICATION_LEVEL)
    }
}

fn default_verification_level() -> Option<String> {
    Some(DEFAULT_VERIFICATION_LEVEL.to_string())
}

/// Years arrive as numbers, numeric strings or null depending on who wrote the JSON.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ===== Applications =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Saved,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Saved => "saved",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "saved" => Ok(ApplicationStatus::Saved),
            "applied" => Ok(ApplicationStatus::Applied),
            "interview" => Ok(ApplicationStatus::Interview),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => anyhow::bail!("Unknown application status: {}", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_url: Option<String>,
    pub job_description: Option<String>,
    pub status: ApplicationStatus,
    pub match_score: Option<i64>,
    pub notes: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationInput {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub match_score: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ===== Chat log =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achievement_input_defaults() {
        let input: AchievementInput =
            serde_json::from_str(r#"{"core_task": "Shipped billing v2"}"#).unwrap();
        assert_eq!(input.core_task, "Shipped billing v2");
        assert!(input.skills_used.is_empty());
        assert!(input.tags.is_empty());
        assert_eq!(input.verification_level.as_deref(), Some("Medium"));
        assert_eq!(input.year, None);
    }

    #[test]
    fn test_achievement_input_requires_core_task() {
        let parsed = serde_json::from_str::<AchievementInput>(r#"{"impact_metric": "40%"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_year_accepts_numeric_strings() {
        let input: AchievementInput =
            serde_json::from_str(r#"{"core_task": "x", "year": "2021"}"#).unwrap();
        assert_eq!(input.year, Some(2021));
        let input: AchievementInput =
            serde_json::from_str(r#"{"core_task": "x", "year": "recently"}"#).unwrap();
        assert_eq!(input.year, None);
    }

    #[test]
    fn test_verification_level_fallback() {
        let mut input: AchievementInput = serde_json::from_str(r#"{"core_task": "x"}"#).unwrap();
        input.verification_level = None;
        assert_eq!(input.verification_level_or_default(), "Medium");
        input.verification_level = Some("High".to_string());
        assert_eq!(input.verification_level_or_default(), "High");
    }

    #[test]
    fn test_application_status_parsing() {
        assert_eq!("Applied".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Applied);
        assert!("ghosted".parse::<ApplicationStatus>().is_err());

        let input: ApplicationInput = serde_json::from_str(r#"{"status": null}"#).unwrap();
        assert_eq!(input.status, ApplicationStatus::Saved);
        let input: ApplicationInput = serde_json::from_str(r#"{"status": "offer"}"#).unwrap();
        assert_eq!(input.status, ApplicationStatus::Offer);
        assert!(serde_json::from_str::<ApplicationInput>(r#"{"status": "ghosted"}"#).is_err());
    }

    #[test]
    fn test_profile_row_decodes_lists() {
        let now = Utc::now();
        let row = ProfileRow {
            id: 1,
            user_id: 7,
            name: None,
            email: Some("a@b.co".to_string()),
            phone: None,
            location: None,
            linkedin: None,
            website: None,
            summary: None,
            branding_color: None,
            branding_font: None,
            target_roles: Some(r#"["Staff Engineer","EM"]"#.to_string()),
            user_values: Some("garbage".to_string()),
            created_at: now,
            updated_at: now,
        };
        let profile = Profile::from(row);
        assert_eq!(profile.target_roles, vec!["Staff Engineer", "EM"]);
        assert!(profile.values.is_empty());
    }
}
