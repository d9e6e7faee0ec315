// src/web/handlers/profile_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::repos::ProfileRepository;
use crate::core::Database;
use crate::types::{Profile, ProfileInput};
use crate::web::error::{ApiError, ApiResult};

pub async fn get_profile_handler(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<Profile> {
    ProfileRepository::new(db)
        .find_by_user(auth.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Profile"))
}

pub async fn update_profile_handler(
    request: Json<ProfileInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Profile> {
    let profile = ProfileRepository::new(db)
        .replace(auth.id, &request)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile"))?;

    app_log!(info, "Updated profile for user {}", auth.id);
    Ok(Json(profile))
}
