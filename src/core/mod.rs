// src/core/mod.rs
//! Persistence, configuration and the language-model integration.

pub mod ai_client;
pub mod assistant;
pub mod config_manager;
pub mod database;
pub mod prompts;
pub mod reply_parser;
pub mod repos;

pub use ai_client::{GeminiClient, LanguageModel, Speaker, Turn};
pub use assistant::{CareerAssistant, ChatReply};
pub use config_manager::AppConfig;
pub use database::Database;
