//! Adapters for the two remote endpoints.
//!
//! Both clients are stateless between calls and shared behind `Arc`. Neither
//! retries: a failure is returned to the stage immediately.

mod completion;
mod image;

pub use completion::{CompletionClient, CompletionRequest, OpenAiCompatibleClient};
pub use image::{ImageClient, InferenceImageClient};

#[cfg(test)]
pub use completion::MockCompletionClient;
#[cfg(test)]
pub use image::MockImageClient;
