// src/web/handlers/ai_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::assistant::CareerAssistant;
use crate::core::repos::{AchievementRepository, ProfileRepository};
use crate::core::Database;
use crate::types::{ProfileDraft, TailorResult};
use crate::web::error::{ApiError, ApiResult};
use crate::web::types::{ExtractProfileRequest, TailorRequest};

pub async fn tailor_handler(
    request: Json<TailorRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    assistant: &State<CareerAssistant>,
) -> ApiResult<TailorResult> {
    let profile = ProfileRepository::new(db).find_by_user(auth.id).await?;
    let achievements = AchievementRepository::new(db).list(auth.id).await?;

    app_log!(
        info,
        "Tailoring for user {} against {} achievements",
        auth.id,
        achievements.len()
    );

    let result = assistant
        .tailor(&request.job_description, profile.as_ref(), &achievements)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(result))
}

pub async fn extract_profile_handler(
    request: Json<ExtractProfileRequest>,
    auth: AuthenticatedUser,
    assistant: &State<CareerAssistant>,
) -> ApiResult<ProfileDraft> {
    app_log!(info, "Extracting profile for user {}", auth.id);
    let draft = assistant
        .extract_profile(&request.resume_text)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(draft))
}
