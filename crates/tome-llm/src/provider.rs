use std::future::Future;
use std::pin::Pin;

use crate::error::LlmError;

/// Boxed embedding future, for call sites that inject embedding as a closure.
pub type EmbedFuture = Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send>>;

pub trait LlmProvider: Send + Sync {
    /// Send a prompt to the model and return the raw text completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the response is invalid.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Map text to a fixed-length embedding vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or returns no vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn name(&self) -> &str;
}
