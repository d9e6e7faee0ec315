// src/web/handlers/chat_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::assistant::CareerAssistant;
use crate::core::repos::{AchievementRepository, ChatRepository};
use crate::core::Database;
use crate::types::ChatRole;
use crate::web::error::{ApiError, ApiResult};
use crate::web::types::{ChatRequest, ChatResponse, HistoryResponse, MessageResponse};

/// Prior messages replayed to the model on each turn.
pub const CONTEXT_WINDOW: i64 = 20;

pub async fn send_message_handler(
    request: Json<ChatRequest>,
    auth: AuthenticatedUser,
    db: &State<Database>,
    assistant: &State<CareerAssistant>,
) -> ApiResult<ChatResponse> {
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }

    let chat = ChatRepository::new(db);
    let history = chat.recent(auth.id, CONTEXT_WINDOW).await?;
    chat.append(auth.id, ChatRole::User, &request.message).await?;

    let reply = assistant
        .converse(&request.message, &history)
        .await
        .map_err(ApiError::Upstream)?;

    chat.append(auth.id, ChatRole::Assistant, &reply.text).await?;

    if let Some(draft) = &reply.achievement {
        let saved = AchievementRepository::new(db).create(auth.id, draft).await?;
        app_log!(info, "Chat captured achievement {} for user {}", saved.id, auth.id);
    }

    Ok(Json(ChatResponse {
        response: reply.text,
        achievement_extracted: reply.achievement,
    }))
}

pub async fn history_handler(auth: AuthenticatedUser, db: &State<Database>) -> ApiResult<HistoryResponse> {
    let messages = ChatRepository::new(db).history(auth.id).await?;
    Ok(Json(HistoryResponse { messages }))
}

pub async fn clear_history_handler(
    auth: AuthenticatedUser,
    db: &State<Database>,
) -> ApiResult<MessageResponse> {
    let removed = ChatRepository::new(db).clear(auth.id).await?;
    app_log!(info, "Cleared {} chat messages for user {}", removed, auth.id);
    Ok(Json(MessageResponse::new("Chat history cleared")))
}
