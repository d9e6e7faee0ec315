// src/core/assistant.rs
//! Career-coaching features backed by a language model: resume parsing, the
//! achievement interview and job tailoring.
//!
//! Without an API key every operation answers with a fixed payload and never
//! calls out. Replies that cannot be parsed degrade to fallback payloads; only
//! transport failures surface as errors.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::app_log;
use crate::core::ai_client::{GeminiClient, LanguageModel, Turn};
use crate::core::config_manager::AiConfig;
use crate::core::prompts;
use crate::core::reply_parser::{extract_fenced_json, extract_json_object, strip_span};
use crate::types::{
    Achievement, AchievementInput, ChatMessage, ChatRole, Profile, ProfileDraft, TailorResult,
};

pub const CHAT_NOT_CONFIGURED: &str =
    "AI features require a Gemini API key. Please configure GEMINI_API_KEY in the environment.";
pub const EXTRACT_NOT_CONFIGURED: &str =
    "AI features require a Gemini API key. Please configure GEMINI_API_KEY.";
pub const EXTRACT_FAILED: &str = "Unable to extract profile information. Please try again.";
pub const TAILOR_NOT_CONFIGURED: &str = "AI features require a Gemini API key.";
pub const TAILOR_NOT_CONFIGURED_HINT: &str = "Configure GEMINI_API_KEY to enable AI features";
pub const TAILOR_FAILED: &str = "Unable to generate tailored summary. Please try again.";
pub const TAILOR_FAILED_HINT: &str = "Try providing more details in the job description";
pub const ACHIEVEMENT_CAPTURED: &str = "\n\n✓ Achievement captured!";
pub const EMPTY_REPLY: &str = "Sorry, I couldn't come up with a reply. Could you say that again?";

const DRAFT_KEY: &str = "achievement_extracted";

/// Assistant turn plus the achievement it captured, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub achievement: Option<AchievementInput>,
}

#[derive(Clone)]
pub struct CareerAssistant {
    model: Option<Arc<dyn LanguageModel>>,
}

impl CareerAssistant {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self { model }
    }

    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let Some(api_key) = config.api_key.clone() else {
            app_log!(warn, "GEMINI_API_KEY not set; AI features will answer with placeholders");
            return Ok(Self::new(None));
        };

        let client = GeminiClient::new(
            api_key,
            config.base_url.clone(),
            config.model.clone(),
            config.timeout_seconds,
        )?;
        app_log!(info, "AI features enabled with model {}", config.model);
        Ok(Self::new(Some(Arc::new(client))))
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    pub async fn extract_profile(&self, resume_text: &str) -> Result<ProfileDraft> {
        let Some(model) = &self.model else {
            return Ok(ProfileDraft::failed(EXTRACT_NOT_CONFIGURED));
        };

        let reply = model
            .generate(&[Turn::user(prompts::profile_extraction(resume_text))])
            .await?;

        let draft = extract_json_object(&reply)
            .and_then(|object| serde_json::from_value::<ProfileDraft>(Value::Object(object)).ok());

        match draft {
            Some(mut draft) => {
                draft.error = None;
                Ok(draft)
            }
            None => {
                app_log!(warn, "Profile extraction reply was not usable JSON ({} chars)", reply.len());
                Ok(ProfileDraft::failed(EXTRACT_FAILED))
            }
        }
    }

    /// One interview turn. `history` is the prior conversation, oldest first,
    /// not including `message`.
    pub async fn converse(&self, message: &str, history: &[ChatMessage]) -> Result<ChatReply> {
        let Some(model) = &self.model else {
            return Ok(ChatReply {
                text: CHAT_NOT_CONFIGURED.to_string(),
                achievement: None,
            });
        };

        let mut turns = Vec::with_capacity(history.len() + 3);
        turns.push(Turn::user(prompts::INTERVIEWER));
        turns.push(Turn::model(prompts::INTERVIEWER_ACK));
        turns.extend(history.iter().map(|entry| match entry.role {
            ChatRole::User => Turn::user(entry.content.clone()),
            ChatRole::Assistant => Turn::model(entry.content.clone()),
        }));
        turns.push(Turn::user(message));

        let reply = model.generate(&turns).await?;
        if reply.trim().is_empty() {
            return Ok(ChatReply {
                text: EMPTY_REPLY.to_string(),
                achievement: None,
            });
        }

        Ok(capture_achievement(reply))
    }

    pub async fn tailor(
        &self,
        job_description: &str,
        profile: Option<&Profile>,
        achievements: &[Achievement],
    ) -> Result<TailorResult> {
        let Some(model) = &self.model else {
            return Ok(TailorResult::fallback(
                TAILOR_NOT_CONFIGURED,
                TAILOR_NOT_CONFIGURED_HINT,
            ));
        };

        let prompt = prompts::tailor(job_description, profile, achievements);
        let reply = model.generate(&[Turn::user(prompt)]).await?;

        let parsed = extract_json_object(&reply)
            .and_then(|object| serde_json::from_value::<TailorResult>(Value::Object(object)).ok());

        let Some(mut result) = parsed else {
            app_log!(warn, "Tailoring reply was not usable JSON ({} chars)", reply.len());
            return Ok(TailorResult::fallback(TAILOR_FAILED, TAILOR_FAILED_HINT));
        };

        let known: HashSet<i64> = achievements.iter().map(|a| a.id).collect();
        let before = result.selected_achievements.len();
        result.selected_achievements.retain(|s| known.contains(&s.id));
        if result.selected_achievements.len() != before {
            app_log!(
                warn,
                "Dropped {} tailored selections with unknown achievement ids",
                before - result.selected_achievements.len()
            );
        }
        result.match_score = result.match_score.clamp(0, 100);

        Ok(result)
    }
}

/// Split a fenced achievement block out of an interview reply. Anything that
/// does not yield a usable draft leaves the reply untouched.
fn capture_achievement(reply: String) -> ChatReply {
    let Some(fenced) = extract_fenced_json(&reply) else {
        return ChatReply {
            text: reply,
            achievement: None,
        };
    };

    let draft = fenced
        .object
        .get(DRAFT_KEY)
        .filter(|value| value.is_object())
        .and_then(|value| serde_json::from_value::<AchievementInput>(value.clone()).ok())
        .filter(|draft| !draft.core_task.trim().is_empty());

    match draft {
        Some(achievement) => {
            let mut text = strip_span(&reply, fenced.span);
            text.push_str(ACHIEVEMENT_CAPTURED);
            ChatReply {
                text,
                achievement: Some(achievement),
            }
        }
        None => {
            if fenced.object.contains_key(DRAFT_KEY) {
                app_log!(warn, "Chat reply carried an achievement block that could not be used");
            }
            ChatReply {
                text: reply,
                achievement: None,
            }
        }
    }
}
