use std::time::Duration;

use crate::error::LlmError;
use crate::provider::LlmProvider;

/// Wraps any provider with a per-call deadline.
///
/// Completion and embedding calls cross a process boundary and can hang;
/// an elapsed deadline surfaces as [`LlmError::Timeout`] so callers can
/// distinguish it from backend failures.
#[derive(Debug, Clone)]
pub struct TimedProvider<P> {
    inner: P,
    timeout: Duration,
}

impl<P: LlmProvider> TimedProvider<P> {
    #[must_use]
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<P: LlmProvider> LlmProvider for TimedProvider<P> {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(provider = self.inner.name(), timeout = ?self.timeout, "completion timed out");
                Err(LlmError::Timeout(self.timeout))
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        match tokio::time::timeout(self.timeout, self.inner.embed(text)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(provider = self.inner.name(), timeout = ?self.timeout, "embedding timed out");
                Err(LlmError::Timeout(self.timeout))
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
