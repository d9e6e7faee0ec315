// src/core/config_manager.rs
//! Layered configuration: built-in defaults, then an optional YAML file, then
//! environment variables. CLI flags are applied last by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 7;
/// Ten years.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
    /// Problems found while loading, held until logging is up.
    #[serde(skip)]
    warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:careeros.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

impl AuthConfig {
    pub fn token_lifetime(&self) -> chrono::Duration {
        let minutes = if valid_ttl(self.token_ttl_minutes) {
            self.token_ttl_minutes
        } else {
            DEFAULT_TOKEN_TTL_MINUTES
        };
        chrono::Duration::minutes(minutes)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl AppConfig {
    /// Defaults, then `path` (or `config.yaml` if present), then the process
    /// environment. An explicit `path` that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.normalize();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.normalize();
        Ok(config)
    }

    /// Overlay variables from `lookup`. Unparseable or out-of-range numbers are
    /// ignored with a warning so a typo does not keep the server from starting.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret_key = secret;
        }
        let ttl = parsed::<_, i64>(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", &mut self.warnings);
        if let Some(minutes) = ttl {
            if valid_ttl(minutes) {
                self.auth.token_ttl_minutes = minutes;
            } else {
                self.warnings.push(ttl_warning("ACCESS_TOKEN_EXPIRE_MINUTES", minutes));
            }
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.ai.model = model;
        }
        if let Some(base_url) = lookup("GEMINI_API_URL") {
            self.ai.base_url = base_url;
        }
        let port = parsed(&lookup, "PORT", &mut self.warnings)
            .or_else(|| parsed(&lookup, "ROCKET_PORT", &mut self.warnings));
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(address) = lookup("BIND_ADDRESS") {
            self.server.address = address;
        }
        if let Some(file) = lookup("LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.secret_key == DEFAULT_SECRET_KEY
    }

    /// Drain the warnings collected while loading.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    fn normalize(&mut self) {
        if !valid_ttl(self.auth.token_ttl_minutes) {
            self.warnings
                .push(ttl_warning("auth.token_ttl_minutes", self.auth.token_ttl_minutes));
            self.auth.token_ttl_minutes = DEFAULT_TOKEN_TTL_MINUTES;
        }
        if self
            .ai
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.ai.api_key = None;
        }
        if self
            .logging
            .file
            .as_ref()
            .is_some_and(|file| file.as_os_str().is_empty())
        {
            self.logging.file = None;
        }
    }
}

fn valid_ttl(minutes: i64) -> bool {
    (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes)
}

fn ttl_warning(key: &str, minutes: i64) -> String {
    format!(
        "Ignoring {}={}: token lifetime must be between 1 and {} minutes",
        key, minutes, MAX_TOKEN_TTL_MINUTES
    )
}

fn parsed<F, T>(lookup: &F, key: &str, warnings: &mut Vec<String>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warnings.push(format!("Ignoring {}={:?}: not a valid number", key, raw));
            None
        }
    }
}
