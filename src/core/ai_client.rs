// src/core/ai_client.rs
//! HTTP client for the hosted generative-language API.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::app_log;
use crate::types::response::{Content, GenerateContentRequest, GenerateContentResponse, Part};

const GENERATE_ENDPOINT: &str = "/v1beta/models";
/// Keeps the key out of URLs, and so out of transport errors and logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Model,
}

impl Speaker {
    fn wire_role(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Model,
            text: text.into(),
        }
    }
}

/// Prompt in, text out. An empty string means the model produced no text.
#[rocket::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, turns: &[Turn]) -> Result<String>;
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}/{}:generateContent",
            self.base_url, GENERATE_ENDPOINT, self.model
        )
    }
}

#[rocket::async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, turns: &[Turn]) -> Result<String> {
        let url = self.endpoint();
        let payload = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: Some(turn.speaker.wire_role().to_string()),
                    parts: vec![Part {
                        text: turn.text.clone(),
                    }],
                })
                .collect(),
        };

        app_log!(debug, "Calling language model: {} ({} turns)", url, turns.len());

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to call language model")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "Language model error {}: {}", status, error_text);
            anyhow::bail!("Language model returned error {}: {}", status, error_text);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse language model response")?;

        match parsed.text() {
            Some(text) => Ok(text),
            None => {
                let reason = parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "none".to_string());
                app_log!(warn, "Language model returned no text (finish reason: {})", reason);
                Ok(String::new())
            }
        }
    }
}
