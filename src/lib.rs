pub mod auth;
pub mod cli;
pub mod core;
pub mod logging;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::core::{AppConfig, CareerAssistant, Database};
pub use web::{build_rocket, start_web_server};
