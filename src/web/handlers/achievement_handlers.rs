// src/web/handlers/achievement_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::repos::AchievementRepository;
use crate::core::Database;
use crate::types::{Achievement, AchievementInput};
use crate::web::error::{ApiError, ApiResult};
use crate::web::types::MessageResponse;

fn validate(input: &AchievementInput) -> Result<(), ApiError> {
    if input.core_task.trim().is_empty() {
        return Err(ApiError::Validation("core_task must not be empty".to_string()));
    }
    Ok(())
}

pub async fn list_achievements_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Achievement>> {
    Ok(Json(AchievementRepository::new(db).list(auth.id).await?))
}

pub async fn create_achievement_handler(
    request: Json<AchievementInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Achievement> {
    validate(&request)?;
    Ok(Json(AchievementRepository::new(db).create(auth.id, &request).await?))
}

pub async fn update_achievement_handler(
    id: i64,
    request: Json<AchievementInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Achievement> {
    validate(&request)?;
    AchievementRepository::new(db)
        .update(id, auth.id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Achievement"))
}

pub async fn delete_achievement_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    if !AchievementRepository::new(db).delete(id, auth.id).await? {
        return Err(ApiError::not_found("Achievement"));
    }
    Ok(Json(MessageResponse::new("Achievement deleted")))
}
