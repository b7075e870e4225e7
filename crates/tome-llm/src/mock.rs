//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::LlmProvider;

type EmbedFn = dyn Fn(&str) -> Vec<f32> + Send + Sync;

#[derive(Clone)]
pub struct MockProvider {
    completions: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    embedding: Vec<f32>,
    embed_fn: Option<Arc<EmbedFn>>,
    /// 0-based embed call indices that return an error.
    fail_embed_calls: Vec<usize>,
    embed_calls: Arc<Mutex<usize>>,
    pub fail_complete: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            completions: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            embedding: vec![0.1; 8],
            embed_fn: None,
            fail_embed_calls: Vec::new(),
            embed_calls: Arc::new(Mutex::new(0)),
            fail_complete: false,
            delay_ms: 0,
        }
    }
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider").finish_non_exhaustive()
    }
}

impl MockProvider {
    /// Queue completion responses returned in order; falls back to
    /// `default_response` once the queue is drained.
    #[must_use]
    pub fn with_completions(completions: Vec<String>) -> Self {
        Self {
            completions: Arc::new(Mutex::new(completions)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_complete: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Derive embeddings from the input text instead of a fixed vector.
    #[must_use]
    pub fn with_embed_fn(mut self, f: impl Fn(&str) -> Vec<f32> + Send + Sync + 'static) -> Self {
        self.embed_fn = Some(Arc::new(f));
        self
    }

    /// Fail the Nth embed calls (0-based) with an embedding error.
    #[must_use]
    pub fn with_failing_embed_calls(mut self, calls: Vec<usize>) -> Self {
        self.fail_embed_calls = calls;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }
}

impl LlmProvider for MockProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_complete {
            return Err(LlmError::Completion("mock LLM error".into()));
        }
        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(completions.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        let call = {
            let mut calls = self.embed_calls.lock().unwrap();
            let current = *calls;
            *calls += 1;
            current
        };
        if self.fail_embed_calls.contains(&call) {
            return Err(LlmError::Embedding(format!(
                "mock embedding error on call {call}"
            )));
        }
        match &self.embed_fn {
            Some(f) => Ok(f(text)),
            None => Ok(self.embedding.clone()),
        }
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_completions_in_order() {
        let provider = MockProvider::with_completions(vec!["one".into(), "two".into()]);
        assert_eq!(provider.complete("q").await.unwrap(), "one");
        assert_eq!(provider.complete("q").await.unwrap(), "two");
        assert_eq!(provider.complete("q").await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn failing_embed_call_by_index() {
        let provider = MockProvider::default().with_failing_embed_calls(vec![1]);
        assert!(provider.embed("a").await.is_ok());
        assert!(matches!(
            provider.embed("b").await,
            Err(LlmError::Embedding(_))
        ));
        assert!(provider.embed("c").await.is_ok());
    }

    #[tokio::test]
    async fn embed_fn_varies_by_text() {
        let provider = MockProvider::default().with_embed_fn(|text| vec![text.len() as f32]);
        assert_eq!(provider.embed("ab").await.unwrap(), vec![2.0]);
        assert_eq!(provider.embed("abcd").await.unwrap(), vec![4.0]);
    }
}
