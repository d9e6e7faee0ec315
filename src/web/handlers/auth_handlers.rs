// src/web/handlers/auth_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::{hash_password, verify_password, AuthenticatedUser, TokenService};
use crate::core::database::is_unique_violation;
use crate::core::repos::{ProfileRepository, UserRepository};
use crate::core::Database;
use crate::utils::is_valid_email;
use crate::web::error::{ApiError, ApiResult};
use crate::web::types::{CredentialsRequest, TokenResponse, UserInfo};

pub const EMAIL_TAKEN: &str = "Email already registered";
pub const BAD_LOGIN: &str = "Incorrect email or password";

pub async fn register_handler(
    request: Json<CredentialsRequest>,
    db: &State<Database>,
    tokens: &State<TokenService>,
) -> ApiResult<TokenResponse> {
    let email = request.email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::Validation("A valid email address is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".to_string()));
    }

    let users = UserRepository::new(db);
    if users.find_by_email(email).await?.is_some() {
        app_log!(warn, "Registration rejected, email already in use: {}", email);
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let user = match users.create(email, &hash_password(&request.password)).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    ProfileRepository::new(db).create_default(user.id, &user.email).await?;

    app_log!(info, "Registered user {} ({})", user.id, user.email);
    Ok(Json(TokenResponse::bearer(tokens.issue_token(user.id)?)))
}

pub async fn login_handler(
    request: Json<CredentialsRequest>,
    db: &State<Database>,
    tokens: &State<TokenService>,
) -> ApiResult<TokenResponse> {
    let user = UserRepository::new(db).find_by_email(request.email.trim()).await?;

    match user {
        Some(user) if verify_password(&request.password, &user.hashed_password) => {
            app_log!(info, "User {} logged in", user.id);
            Ok(Json(TokenResponse::bearer(tokens.issue_token(user.id)?)))
        }
        _ => {
            app_log!(warn, "Failed login for {}", request.email.trim());
            Err(ApiError::Unauthorized(BAD_LOGIN.to_string()))
        }
    }
}

pub async fn me_handler(auth: AuthenticatedUser) -> Json<UserInfo> {
    Json(UserInfo {
        id: auth.id,
        email: auth.email,
    })
}
