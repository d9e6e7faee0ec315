// src/web/handlers/application_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AuthenticatedUser;
use crate::core::repos::ApplicationRepository;
use crate::core::Database;
use crate::types::{Application, ApplicationInput};
use crate::web::error::{ApiError, ApiResult};
use crate::web::types::MessageResponse;

pub async fn list_applications_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Application>> {
    Ok(Json(ApplicationRepository::new(db).list(auth.id).await?))
}

pub async fn create_application_handler(
    request: Json<ApplicationInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    Ok(Json(ApplicationRepository::new(db).create(auth.id, &request).await?))
}

pub async fn update_application_handler(
    id: i64,
    request: Json<ApplicationInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    ApplicationRepository::new(db)
        .update(id, auth.id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Application"))
}

pub async fn delete_application_handler(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    if !ApplicationRepository::new(db).delete(id, auth.id).await? {
        return Err(ApiError::not_found("Application"));
    }
    Ok(Json(MessageResponse::new("Application deleted")))
}
