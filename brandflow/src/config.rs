//! Configuration for the completion and image endpoints.
//!
//! Values come from the environment (optionally via a `.env` file) with
//! in-code defaults. Secrets are never printed by `Debug`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::context::{PipelineVariant, StageBudgets};
use crate::errors::ConfigError;

/// Environment variable holding the completion API key.
pub const ENV_COMPLETION_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable selecting the completion backend.
pub const ENV_COMPLETION_BASE_URL: &str = "CUSTOM_BASE_URL";
/// Environment variable holding the image API token.
pub const ENV_IMAGE_TOKEN: &str = "HF_TOKEN";

/// Default completion backend.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default completion model, shared by both pipeline variants.
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
/// Sampling temperature used for every completion call.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Fixed remote inference endpoint for image generation.
pub const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";
/// Image call timeout.
pub const DEFAULT_IMAGE_TIMEOUT_SECONDS: f64 = 60.0;

/// Template values that mean "not configured".
const PLACEHOLDER_SECRETS: [&str; 3] = [
    "your_hugging_face_token_here",
    "your_groq_api_key_here",
    "your_openai_api_key_here",
];

/// Completion endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Bearer credential.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds; transport defaults when unset.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_seconds: None,
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("has_api_key", &self.api_key().is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl CompletionConfig {
    /// The API key, unless it is blank or a placeholder.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        usable_secret(self.api_key.as_deref())
    }

    /// The full chat-completions URL.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// The request timeout, if one is configured.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout_seconds
            .map(|seconds| timeout_from_secs("completion.timeout_seconds", seconds))
            .transpose()
    }
}

/// Image endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Bearer token.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Inference URL.
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_image_timeout")]
    pub timeout_seconds: f64,
}

fn default_image_endpoint() -> String {
    DEFAULT_IMAGE_ENDPOINT.to_string()
}

fn default_image_timeout() -> f64 {
    DEFAULT_IMAGE_TIMEOUT_SECONDS
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            token: None,
            endpoint: default_image_endpoint(),
            timeout_seconds: default_image_timeout(),
        }
    }
}

impl fmt::Debug for ImageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageConfig")
            .field("has_token", &self.token().is_some())
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ImageConfig {
    /// The token, unless it is blank or a placeholder.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        usable_secret(self.token.as_deref())
    }

    /// The request timeout.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        timeout_from_secs("image.timeout_seconds", self.timeout_seconds)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandflowConfig {
    /// Completion endpoint settings.
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Image endpoint settings.
    #[serde(default)]
    pub image: ImageConfig,
    /// Pipeline variant.
    #[serde(default)]
    pub variant: PipelineVariant,
    /// Token budget overrides; the variant's defaults when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<StageBudgets>,
}

impl BrandflowConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a `.env` file if present, then reads the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.completion.api_key = lookup(ENV_COMPLETION_API_KEY);
        if let Some(base_url) = lookup(ENV_COMPLETION_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.completion.base_url = base_url;
        }
        config.image.token = lookup(ENV_IMAGE_TOKEN);
        config
    }

    /// Sets the pipeline variant.
    #[must_use]
    pub fn with_variant(mut self, variant: PipelineVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the completion API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.completion.api_key = Some(api_key.into());
        self
    }

    /// Sets the completion base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.completion.base_url = base_url.into();
        self
    }

    /// Sets the completion model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.completion.model = model.into();
        self
    }

    /// Sets the image token.
    #[must_use]
    pub fn with_image_token(mut self, token: impl Into<String>) -> Self {
        self.image.token = Some(token.into());
        self
    }

    /// Sets the image endpoint.
    #[must_use]
    pub fn with_image_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.image.endpoint = endpoint.into();
        self
    }

    /// Overrides the token budgets.
    #[must_use]
    pub fn with_budgets(mut self, budgets: StageBudgets) -> Self {
        self.budgets = Some(budgets);
        self
    }

    /// The effective token budgets.
    #[must_use]
    pub fn budgets(&self) -> StageBudgets {
        self.budgets
            .unwrap_or_else(|| self.variant.default_budgets())
    }

    /// Checks that the non-secret values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.completion.base_url.trim().is_empty() {
            return Err(invalid("completion.base_url", "must not be empty"));
        }
        if self.completion.model.trim().is_empty() {
            return Err(invalid("completion.model", "must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(invalid("completion.temperature", "must be between 0 and 2"));
        }
        self.completion.timeout()?;
        if self.image.endpoint.trim().is_empty() {
            return Err(invalid("image.endpoint", "must not be empty"));
        }
        self.image.timeout()?;
        Ok(())
    }

    /// Which capabilities the configured credentials enable.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            completion: self.completion.api_key().is_some(),
            image_generation: self.image.token().is_some(),
        }
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn timeout_from_secs(key: &str, seconds: f64) -> Result<Duration, ConfigError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(invalid(key, "must be positive"));
    }
    Duration::try_from_secs_f64(seconds).map_err(|_| invalid(key, "is too large"))
}

fn usable_secret(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !PLACEHOLDER_SECRETS.contains(v))
}

/// What the current configuration can do.
///
/// A missing image token is a degraded state: stages 1-3 still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Text stages can authenticate.
    pub completion: bool,
    /// The image stage can authenticate.
    pub image_generation: bool,
}

impl Capabilities {
    /// Warnings for the presentation shell.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.completion {
            warnings.push(format!(
                "Text generation unavailable: set {ENV_COMPLETION_API_KEY}"
            ));
        }
        if !self.image_generation {
            warnings.push(format!("Image generation unavailable: set {ENV_IMAGE_TOKEN}"));
        }
        warnings
    }
}
