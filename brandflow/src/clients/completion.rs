//! Chat-completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::config::CompletionConfig;
use crate::errors::{extract_api_error, CompletionError, ConfigError};

/// One completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full instruction text.
    pub prompt: String,
    /// Model identifier.
    pub model: String,
    /// Upper bound on generated tokens. Not enforced locally.
    pub max_tokens: NonZeroU32,
}

impl CompletionRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, max_tokens: NonZeroU32) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens,
        }
    }
}

/// Generates text for a single user prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the generated text, or a typed failure.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("url", &self.url)
            .field("has_api_key", &self.api_key.is_some())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    /// Builds a client from configuration.
    pub fn new(config: &CompletionConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout()? {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ConfigError::InvalidValue {
            key: "completion".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            http,
            url: config.completions_url(),
            api_key: config.api_key().map(str::to_string),
            temperature: config.temperature,
        })
    }

    /// The endpoint URL requests are sent to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        if request.prompt.trim().is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Auth("no API key configured".to_string()))?;

        let body = ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            model: &request.model,
            max_tokens: request.max_tokens.get(),
            temperature: self.temperature,
        };

        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens.get(),
            prompt_chars = request.prompt.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let payload = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CompletionError::Auth(extract_api_error(&payload)));
        }
        if !status.is_success() {
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                detail: extract_api_error(&payload),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&payload)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::MalformedResponse("no message content in first choice".to_string())
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
