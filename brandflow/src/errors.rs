//! Error types for the brandflow pipeline.
//!
//! Every failure is returned at the stage boundary. Nothing in this crate
//! retries, and no error is fatal to the process: the run keeps its previous
//! state and the caller decides whether to try the same action again.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::context::ToneSelection;
use crate::core::StageId;

/// The main error type for brandflow operations.
#[derive(Debug, Error)]
pub enum BrandflowError {
    /// A credential or setting is missing or unusable.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Required user input is missing or malformed, or the run is not ready.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A completion call made by a text stage failed.
    #[error("{stage} stage failed: {source}")]
    Completion {
        /// The stage that issued the call.
        stage: StageId,
        /// The underlying client error.
        #[source]
        source: CompletionError,
    },

    /// The image generation call failed.
    #[error("Image generation failed: {0}")]
    Image(#[from] ImageError),
}

impl BrandflowError {
    /// Wraps a completion failure with the stage that produced it.
    #[must_use]
    pub fn completion(stage: StageId, source: CompletionError) -> Self {
        Self::Completion { stage, source }
    }

    /// Classifies the error for reporting.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Completion { source, .. } => source.kind(),
            Self::Image(err) => err.kind(),
        }
    }

    /// Returns true if the condition resolves itself and the same action
    /// can simply be tried again later.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::ModelLoading
    }

    /// Returns the stage the error is attributed to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::Completion { stage, .. } => Some(*stage),
            Self::Image(_) | Self::Config(ConfigError::MissingImageToken) => Some(StageId::Image),
            Self::Validation(err) => err.stage(),
            Self::Config(_) => None,
        }
    }

    /// Builds the structured diagnostic for this error.
    #[must_use]
    pub fn error_info(&self) -> ErrorInfo {
        let code = match self {
            Self::Config(ConfigError::MissingCompletionKey) => "BRANDFLOW-CONFIG-COMPLETION_KEY",
            Self::Config(ConfigError::MissingImageToken) => "BRANDFLOW-CONFIG-IMAGE_TOKEN",
            Self::Config(ConfigError::InvalidValue { .. }) => "BRANDFLOW-CONFIG-INVALID",
            Self::Validation(_) => "BRANDFLOW-VALIDATION",
            Self::Completion { source, .. } => match source {
                CompletionError::Auth(_) => "BRANDFLOW-COMPLETION-AUTH",
                CompletionError::Transport(_) => "BRANDFLOW-COMPLETION-TRANSPORT",
                CompletionError::Upstream { .. } | CompletionError::MalformedResponse(_) => {
                    "BRANDFLOW-COMPLETION-UPSTREAM"
                }
                CompletionError::EmptyPrompt => "BRANDFLOW-COMPLETION-EMPTY_PROMPT",
            },
            Self::Image(err) => match err {
                ImageError::MissingCredential => "BRANDFLOW-IMAGE-CREDENTIAL",
                ImageError::ModelLoading => "BRANDFLOW-IMAGE-LOADING",
                ImageError::Upstream { .. } => "BRANDFLOW-IMAGE-UPSTREAM",
                ImageError::Transport(_) => "BRANDFLOW-IMAGE-TRANSPORT",
                ImageError::EmptyPrompt => "BRANDFLOW-IMAGE-EMPTY_PROMPT",
            },
        };

        let mut info = ErrorInfo::new(code, self.to_string())
            .with_context_entry("kind", self.kind().to_string());
        if let Some(stage) = self.stage() {
            info = info.with_context_entry("stage", stage.to_string());
        }
        if let Some(hint) = self.fix_hint() {
            info = info.with_fix_hint(hint);
        }
        info
    }

    /// The message shown to the user by the presentation shell.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.fix_hint() {
            Some(hint) if self.is_recoverable() => hint.to_string(),
            Some(hint) => format!("{self}. {hint}"),
            None => self.to_string(),
        }
    }

    fn fix_hint(&self) -> Option<&'static str> {
        match self {
            Self::Image(ImageError::ModelLoading) => Some(
                "Image generation model is loading. Please try again shortly.",
            ),
            Self::Image(ImageError::MissingCredential)
            | Self::Config(ConfigError::MissingImageToken) => {
                Some("Set HF_TOKEN to enable image generation")
            }
            Self::Config(ConfigError::MissingCompletionKey) => {
                Some("Set OPENAI_API_KEY to enable text generation")
            }
            Self::Completion {
                source: CompletionError::Auth(_),
                ..
            } => Some("Check the OPENAI_API_KEY and CUSTOM_BASE_URL settings"),
            _ => None,
        }
    }
}

/// Coarse error classification used for logging and user reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or placeholder configuration.
    Config,
    /// Credential rejected or absent at call time.
    Auth,
    /// Network failure or timeout.
    Transport,
    /// Non-success response from a remote endpoint.
    Upstream,
    /// The image model is warming up; retry later.
    ModelLoading,
    /// User input or run state does not allow the action.
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Auth => write!(f, "auth"),
            Self::Transport => write!(f, "transport"),
            Self::Upstream => write!(f, "upstream"),
            Self::ModelLoading => write!(f, "model_loading"),
            Self::Validation => write!(f, "validation"),
        }
    }
}

/// Errors raised before any network call because configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No completion API key is configured.
    #[error("Completion API key is not configured")]
    MissingCompletionKey,

    /// No image token is configured; image generation is disabled.
    #[error("Image generation token is not configured")]
    MissingImageToken,

    /// A configured value could not be used.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Errors raised when user input or run state does not permit an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required business field is blank.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// The field name.
        field: &'static str,
    },

    /// The wrong number of deliverables was selected.
    #[error("Select exactly {expected} deliverables (got {actual})")]
    DeliverableCount {
        /// Required count.
        expected: usize,
        /// Selected count.
        actual: usize,
    },

    /// A deliverable label is not one of the known formats.
    #[error("Unknown deliverable: {0}")]
    UnknownDeliverable(String),

    /// A tone label is not one of the known styles.
    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    /// The stage's upstream output does not exist yet.
    #[error("Cannot run {stage} stage before the {requires} stage has completed")]
    StageNotReady {
        /// The stage that was requested.
        stage: StageId,
        /// The stage whose output is missing.
        requires: StageId,
    },

    /// Regeneration was requested for a stage with no output.
    #[error("Nothing to regenerate: the {stage} stage has not produced output")]
    NothingToRegenerate {
        /// The stage that was requested.
        stage: StageId,
    },

    /// An edit was requested for a stage with no output.
    #[error("Nothing to edit: the {stage} stage has not produced output")]
    NothingToEdit {
        /// The stage that was requested.
        stage: StageId,
    },

    /// The tone was already fixed for this run.
    #[error("Tone is locked to {locked} for this run (requested {requested}); restart with a new briefing to change it")]
    ToneLocked {
        /// The tone fixed for the run.
        locked: ToneSelection,
        /// The tone that was requested.
        requested: ToneSelection,
    },

    /// The image prompt text is empty.
    #[error("Image prompt is empty")]
    EmptyPrompt,
}

impl ValidationError {
    /// Returns the stage the error refers to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<StageId> {
        match self {
            Self::StageNotReady { stage, .. }
            | Self::NothingToRegenerate { stage }
            | Self::NothingToEdit { stage } => Some(*stage),
            Self::ToneLocked { .. } | Self::UnknownTone(_) => Some(StageId::Enhancement),
            Self::EmptyPrompt => Some(StageId::Image),
            Self::MissingField { .. }
            | Self::DeliverableCount { .. }
            | Self::UnknownDeliverable(_) => Some(StageId::Briefing),
        }
    }
}

/// Errors from the completion client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The credential is missing or was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The request did not complete (network error or timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("Completion API error ({status}): {detail}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response payload.
        detail: String,
    },

    /// The endpoint answered 2xx without usable content.
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    /// The prompt was empty.
    #[error("Prompt must not be empty")]
    EmptyPrompt,
}

impl CompletionError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::Auth,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Upstream { .. } | Self::MalformedResponse(_) => ErrorKind::Upstream,
            Self::EmptyPrompt => ErrorKind::Validation,
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Errors from the image client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// No usable token is configured.
    #[error("Image generation token is not configured")]
    MissingCredential,

    /// The model is warming up (HTTP 503).
    #[error("Image generation model is loading")]
    ModelLoading,

    /// The endpoint answered with another non-success status.
    #[error("Image API error ({status}): {detail}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response payload.
        detail: String,
    },

    /// The request did not complete (network error or timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The prompt was empty.
    #[error("Prompt must not be empty")]
    EmptyPrompt,
}

impl ImageError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::Config,
            Self::ModelLoading => ErrorKind::ModelLoading,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Transport(_) => ErrorKind::Transport,
            Self::EmptyPrompt => ErrorKind::Validation,
        }
    }
}

impl From<reqwest::Error> for ImageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Structured error diagnostics for the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "BRANDFLOW-IMAGE-LOADING").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for resolving the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }

        map
    }
}

/// Extracts a readable detail from an OpenAI-style error payload.
///
/// Falls back to the raw body when it is not a recognised envelope.
pub(crate) fn extract_api_error(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Option<ApiError>,
    }
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ApiError {
        Detailed {
            message: Option<String>,
            #[serde(rename = "type")]
            kind: Option<String>,
        },
        Plain(String),
    }

    match serde_json::from_str::<Envelope>(body).ok().and_then(|e| e.error) {
        Some(ApiError::Detailed { message, kind }) => {
            let message = message.unwrap_or_else(|| "unknown error".to_string());
            match kind {
                Some(kind) => format!("{message} (type={kind})"),
                None => message,
            }
        }
        Some(ApiError::Plain(message)) => message,
        None => body.trim().to_string(),
    }
}
