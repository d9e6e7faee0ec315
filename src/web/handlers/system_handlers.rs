// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::core::Database;
use crate::web::types::HealthResponse;

pub async fn health_handler(db: &State<Database>) -> (Status, Json<HealthResponse>) {
    match db.health_check().await {
        Ok(()) => (
            Status::Ok,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        ),
        Err(e) => {
            app_log!(error, "Health check failed: {:#}", e);
            (
                Status::ServiceUnavailable,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
