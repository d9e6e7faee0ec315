// src/web/error.rs
use rocket::http::{Header, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{Request, Response};
use thiserror::Error;

use crate::app_log;
use crate::auth::AuthError;
use crate::web::types::StandardErrorResponse;

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("AI service error: {0:#}")]
    Upstream(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} not found", what))
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Conflict(_) | ApiError::Validation(_) => Status::BadRequest,
            ApiError::Upstream(_) => Status::BadGateway,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Upstream(_) => "AI_SERVICE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            ApiError::Unauthorized(_) => &["Log in again to obtain a fresh token"],
            ApiError::NotFound(_) => &["Check the id and that the record belongs to you"],
            ApiError::Conflict(_) => &["Log in instead, or use a different email"],
            ApiError::Validation(_) => &["Check the required fields and try again"],
            ApiError::Upstream(_) => &["Try again in a few moments"],
            ApiError::Internal(_) => &[
                "Try again in a few moments",
                "Contact support if the problem persists",
            ],
        };
        hints.iter().map(|h| h.to_string()).collect()
    }

    /// Text safe to show the caller. Internal details stay in the log.
    fn public_message(&self) -> String {
        match self {
            ApiError::Upstream(_) => "AI service request failed".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::DatabaseError => ApiError::Internal(anyhow::anyhow!(error.message())),
            other => ApiError::Unauthorized(other.message().to_string()),
        }
    }
}

/// Attach the error body and, for 401s, the bearer challenge.
pub fn error_response<'r>(
    req: &'r Request<'_>,
    status: Status,
    body: StandardErrorResponse,
) -> response::Result<'static> {
    let mut response = Response::build_from(Json(body).respond_to(req)?)
        .status(status)
        .finalize();
    if status == Status::Unauthorized {
        response.set_header(Header::new("WWW-Authenticate", "Bearer"));
    }
    Ok(response)
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ApiError::Internal(e) => app_log!(error, "{} {}: {:#}", req.method(), req.uri(), e),
            ApiError::Upstream(e) => app_log!(error, "{} {}: AI call failed: {:#}", req.method(), req.uri(), e),
            _ => {}
        }

        let body = StandardErrorResponse::new(self.public_message(), self.code(), self.suggestions());
        error_response(req, self.status(), body)
    }
}
