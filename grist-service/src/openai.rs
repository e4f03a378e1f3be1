//! OpenAI chat completion model.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use grist_memory::Message;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::completion::CompletionModel;
use crate::error::{Result, ServiceError};

/// The OpenAI chat completions API endpoint.
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// The default chat model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A [`CompletionModel`] backed by the OpenAI chat completions API.
///
/// All failures — HTTP transport, API errors, unexpected response shapes —
/// surface as [`ServiceError::Model`]. The call is not retried.
///
/// # Example
///
/// ```rust,ignore
/// use grist_service::openai::OpenAiChatModel;
///
/// let model = OpenAiChatModel::from_env()?;
/// let answer = model.complete("You are a helpful assistant.", &messages).await?;
/// ```
pub struct OpenAiChatModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiChatModel {
    /// Create a new model client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Model`] if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ServiceError::Model("OpenAI API key must not be empty".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Create a new model client from the `OPENAI_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ServiceError::Model("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    /// Set the model name (e.g. `gpt-4o`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ── CompletionModel implementation ─────────────────────────────────

#[async_trait]
impl CompletionModel for OpenAiChatModel {
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        debug!(model = %self.model, message_count = messages.len(), "requesting completion");

        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage { role: "system", content: system_prompt });
        for message in messages {
            wire.push(WireMessage { role: message.role.as_str(), content: &message.content });
        }

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { model: &self.model, messages: wire })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                ServiceError::Model(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "completion API error");
            return Err(ServiceError::Model(format!("API returned {status}: {body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Model(format!("failed to parse response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::Model("API returned no completion choices".to_string()))
    }
}
