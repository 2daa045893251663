//! Scripted clients that replay canned responses and record every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::clients::{CompletionClient, CompletionRequest, ImageClient};
use crate::errors::{CompletionError, ImageError};

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// A completion request.
    Completion(CompletionRequest),
    /// An image request with its prompt.
    Image(String),
}

impl RecordedCall {
    /// The prompt sent with the call.
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            Self::Completion(request) => &request.prompt,
            Self::Image(prompt) => prompt,
        }
    }

    /// Returns true for image calls.
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// A call log shared by several scripted clients, so ordering across them
/// can be checked.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    /// Returns all recorded calls in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// The most recent call.
    #[must_use]
    pub fn last(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }

    /// Clears the log.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// A completion client that answers from a queue of scripted results.
///
/// An exhausted queue answers with an `Upstream` error so a missing script
/// entry shows up as a stage failure rather than a hang.
#[derive(Debug, Default)]
pub struct ScriptedCompletionClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    log: CallLog,
}

impl ScriptedCompletionClient {
    /// Creates a client recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            log,
        }
    }

    /// Queues a successful reply.
    #[must_use]
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push_reply(text);
        self
    }

    /// Queues a successful reply on a shared client.
    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies.lock().push_back(Ok(text.into()));
    }

    /// Queues a failure on a shared client.
    pub fn push_error(&self, error: CompletionError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Number of scripted results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }

    /// The requests this client has received.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.log
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::Completion(request) => Some(request),
                RecordedCall::Image(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.log.record(RecordedCall::Completion(request.clone()));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CompletionError::Upstream {
                    status: 500,
                    detail: "no scripted reply left".to_string(),
                })
            })
    }
}

/// An image client that answers from a queue of scripted results.
#[derive(Debug, Default)]
pub struct ScriptedImageClient {
    replies: Mutex<VecDeque<Result<Vec<u8>, ImageError>>>,
    log: CallLog,
}

impl ScriptedImageClient {
    /// Creates a client recording into `log`.
    #[must_use]
    pub fn new(log: CallLog) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            log,
        }
    }

    /// Queues a successful image.
    #[must_use]
    pub fn with_image(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.push_image(bytes);
        self
    }

    /// Queues a successful image on a shared client.
    pub fn push_image(&self, bytes: impl Into<Vec<u8>>) {
        self.replies.lock().push_back(Ok(bytes.into()));
    }

    /// Queues a failure on a shared client.
    pub fn push_error(&self, error: ImageError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Number of scripted results not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl ImageClient for ScriptedImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        self.log.record(RecordedCall::Image(prompt.to_string()));
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ImageError::Upstream {
                    status: 500,
                    detail: "no scripted image left".to_string(),
                })
            })
    }
}
