// src/web/mod.rs

pub mod error;
pub mod handlers;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State};

use crate::app_log;
use crate::auth::{AuthError, AuthFailure, AuthenticatedUser, TokenService};
use crate::core::assistant::CareerAssistant;
use crate::core::config_manager::AppConfig;
use crate::core::Database;
use crate::types::{
    Achievement, AchievementInput, Application, ApplicationInput, Profile, ProfileDraft,
    ProfileInput, TailorResult,
};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        // Credentials are not allowed alongside a wildcard origin, so echo it back.
        let origin = request.headers().get_one("Origin").unwrap_or("*").to_string();
        response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new("Vary", "Origin"));
    }
}

// ===== Auth =====

#[post("/auth/register", data = "<request>")]
pub async fn register(
    request: Json<CredentialsRequest>,
    db: &State<Database>,
    tokens: &State<TokenService>,
) -> ApiResult<TokenResponse> {
    handlers::register_handler(request, db, tokens).await
}

#[post("/auth/login", data = "<request>")]
pub async fn login(
    request: Json<CredentialsRequest>,
    db: &State<Database>,
    tokens: &State<TokenService>,
) -> ApiResult<TokenResponse> {
    handlers::login_handler(request, db, tokens).await
}

#[get("/auth/me")]
pub async fn me(auth: AuthenticatedUser) -> Json<UserInfo> {
    handlers::me_handler(auth).await
}

// ===== Profile =====

#[get("/profile")]
pub async fn get_profile(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<Profile> {
    handlers::get_profile_handler(auth, db).await
}

#[put("/profile", data = "<request>")]
pub async fn update_profile(
    request: Json<ProfileInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Profile> {
    handlers::update_profile_handler(request, auth, db).await
}

// ===== Achievements =====

#[get("/achievements")]
pub async fn list_achievements(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Achievement>> {
    handlers::list_achievements_handler(auth, db).await
}

#[post("/achievements", data = "<request>")]
pub async fn create_achievement(
    request: Json<AchievementInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Achievement> {
    handlers::create_achievement_handler(request, auth, db).await
}

#[put("/achievements/<id>", data = "<request>")]
pub async fn update_achievement(
    id: i64,
    request: Json<AchievementInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Achievement> {
    handlers::update_achievement_handler(id, request, auth, db).await
}

#[delete("/achievements/<id>")]
pub async fn delete_achievement(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    handlers::delete_achievement_handler(id, auth, db).await
}

// ===== Applications =====

#[get("/applications")]
pub async fn list_applications(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Vec<Application>> {
    handlers::list_applications_handler(auth, db).await
}

#[post("/applications", data = "<request>")]
pub async fn create_application(
    request: Json<ApplicationInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    handlers::create_application_handler(request, auth, db).await
}

#[put("/applications/<id>", data = "<request>")]
pub async fn update_application(
    id: i64,
    request: Json<ApplicationInput>,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<Application> {
    handlers::update_application_handler(id, request, auth, db).await
}

#[delete("/applications/<id>")]
pub async fn delete_application(
    id: i64,
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    handlers::delete_application_handler(id, auth, db).await
}

// ===== Chat =====

#[post("/chat", data = "<request>")]
pub async fn send_message(
    request: Json<ChatRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    assistant: &State<CareerAssistant>,
) -> ApiResult<ChatResponse> {
    handlers::send_message_handler(request, auth, db, assistant).await
}

#[get("/chat/history")]
pub async fn chat_history(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<HistoryResponse> {
    handlers::history_handler(auth, db).await
}

#[delete("/chat/history")]
pub async fn clear_chat_history(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    handlers::clear_history_handler(auth, db).await
}

// ===== AI =====

#[post("/tailor", data = "<request>")]
pub async fn tailor(
    request: Json<TailorRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    assistant: &State<CareerAssistant>,
) -> ApiResult<TailorResult> {
    handlers::tailor_handler(request, auth, db, assistant).await
}

#[post("/extract-profile", data = "<request>")]
pub async fn extract_profile(
    request: Json<ExtractProfileRequest>,
    auth: AuthenticatedUser,
    assistant: &State<CareerAssistant>,
) -> ApiResult<ProfileDraft> {
    handlers::extract_profile_handler(request, auth, assistant).await
}

// ===== System =====

#[get("/healthz")]
pub async fn healthz(db: &State<Database>) -> (Status, Json<HealthResponse>) {
    handlers::health_handler(db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers

/// Catcher output: the standard error body under the caught status.
pub struct CaughtError(Status, StandardErrorResponse);

impl<'r> Responder<'r, 'static> for CaughtError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        error::error_response(req, self.0, self.1)
    }
}

fn caught(status: Status, message: &str, code: &str, suggestions: &[&str]) -> CaughtError {
    CaughtError(
        status,
        StandardErrorResponse::new(
            message,
            code,
            suggestions.iter().map(|s| s.to_string()).collect(),
        ),
    )
}

#[rocket::catch(400)]
pub fn bad_request() -> CaughtError {
    caught(
        Status::BadRequest,
        "Invalid request format",
        "BAD_REQUEST",
        &[
            "Check your request JSON format",
            "Verify all required fields are present",
        ],
    )
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request<'_>) -> CaughtError {
    let failure = req.local_cache(|| AuthFailure(None)).0.unwrap_or(AuthError::MissingToken);
    caught(
        Status::Unauthorized,
        failure.message(),
        failure.code(),
        &["Send an Authorization: Bearer <token> header", "Log in again if your token expired"],
    )
}

#[rocket::catch(404)]
pub fn not_found() -> CaughtError {
    caught(
        Status::NotFound,
        "Resource not found",
        "NOT_FOUND",
        &["Check the request path"],
    )
}

#[rocket::catch(422)]
pub fn unprocessable() -> CaughtError {
    caught(
        Status::UnprocessableEntity,
        "Request body failed validation",
        "VALIDATION_ERROR",
        &[
            "Verify all required fields are present",
            "Check field types against the API documentation",
        ],
    )
}

#[rocket::catch(500)]
pub fn internal_error() -> CaughtError {
    caught(
        Status::InternalServerError,
        "Internal server error",
        "INTERNAL_ERROR",
        &[
            "Try again in a few moments",
            "Contact support if the problem persists",
        ],
    )
}

/// Assemble the application around already-built services.
pub fn build_rocket(
    figment: Figment,
    db: Database,
    tokens: TokenService,
    assistant: CareerAssistant,
) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(db)
        .manage(tokens)
        .manage(assistant)
        .register(
            "/",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount("/", routes![healthz])
        .mount(
            "/api",
            routes![
                register,
                login,
                me,
                get_profile,
                update_profile,
                list_achievements,
                create_achievement,
                update_achievement,
                delete_achievement,
                list_applications,
                create_application,
                update_application,
                delete_application,
                send_message,
                chat_history,
                clear_chat_history,
                tailor,
                extract_profile,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    if config.uses_default_secret() {
        app_log!(warn, "SECRET_KEY is the built-in default; set a real secret before deploying");
    }

    let db = Database::connect(&config.database.url).await.map_err(|e| {
        app_log!(error, "Failed to initialize database: {:#}", e);
        e
    })?;
    let tokens = TokenService::new(&config.auth.secret_key, config.auth.token_lifetime());
    let assistant = CareerAssistant::from_config(&config.ai)?;

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    app_log!(
        info,
        "Starting CareerOS API on {}:{}",
        config.server.address,
        config.server.port
    );
    app_log!(info, "Database: {}", config.database.url);

    build_rocket(figment, db, tokens, assistant)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
