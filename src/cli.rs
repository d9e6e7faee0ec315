// src/cli.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::app_log;
use crate::auth::hash_password;
use crate::core::config_manager::AppConfig;
use crate::core::repos::{ProfileRepository, UserRepository};
use crate::core::Database;
use crate::utils::is_valid_email;
use crate::web::start_web_server;

#[derive(Parser)]
#[command(name = "careeros")]
#[command(about = "CareerOS career-management API")]
pub struct Cli {
    /// YAML config file (defaults to ./config.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create the database schema and exit
    InitDb,
    /// Register a user directly in the database
    CreateUser { email: String, password: String },
}

impl Cli {
    /// Fold CLI flags into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(Command::Serve { port: Some(port) }) = &self.command {
            config.server.port = *port;
        }
    }
}

pub async fn handle_command(command: Option<Command>, config: AppConfig) -> Result<()> {
    match command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { .. } => start_web_server(config).await,

        Command::InitDb => {
            Database::connect(&config.database.url).await?;
            app_log!(info, "✅ Database ready at {}", config.database.url);
            Ok(())
        }

        Command::CreateUser { email, password } => {
            let db = Database::connect(&config.database.url).await?;
            let user_id = create_user(&db, &email, &password).await?;
            app_log!(info, "✅ Created user {} ({})", user_id, email.trim());
            Ok(())
        }
    }
}

/// Same checks and side effects as registration over HTTP.
pub async fn create_user(db: &Database, email: &str, password: &str) -> Result<i64> {
    let email = email.trim();
    if !is_valid_email(email) {
        anyhow::bail!("'{}' is not a valid email address", email);
    }
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let users = UserRepository::new(db);
    if users.find_by_email(email).await?.is_some() {
        anyhow::bail!("Email '{}' already exists", email);
    }

    let user = users.create(email, &hash_password(password)).await?;
    ProfileRepository::new(db).create_default(user.id, &user.email).await?;
    Ok(user.id)
}
