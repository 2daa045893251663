//! Text-to-image client.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::ImageConfig;
use crate::errors::{extract_api_error, ConfigError, ImageError};

/// Generates an image for a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Returns raw image bytes, or a typed failure.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;
}

/// Client for hosted inference endpoints that accept `{"inputs": prompt}` and
/// answer with raw image bytes.
#[derive(Clone)]
pub struct InferenceImageClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl std::fmt::Debug for InferenceImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceImageClient")
            .field("endpoint", &self.endpoint)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl InferenceImageClient {
    /// Builds a client from configuration. A missing token is not an error
    /// here; calls fail with `MissingCredential` instead.
    pub fn new(config: &ImageConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout()?)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "image".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token().map(str::to_string),
        })
    }

    /// Returns true if a token is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[async_trait]
impl ImageClient for InferenceImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        if prompt.trim().is_empty() {
            return Err(ImageError::EmptyPrompt);
        }
        let token = self.token.as_deref().ok_or(ImageError::MissingCredential)?;

        tracing::debug!(prompt_chars = prompt.len(), "Sending image generation request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&InferenceRequest { inputs: prompt })
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ImageError::ModelLoading);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageError::Upstream {
                status: status.as_u16(),
                detail: extract_api_error(&body),
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ImageError::Upstream {
                status: status.as_u16(),
                detail: "empty image payload".to_string(),
            });
        }
        Ok(bytes.to_vec())
    }
}
