use std::sync::Arc;

use tome_llm::LlmProvider;
use tome_store::VectorStore;

use crate::error::RagError;
use crate::expander::QueryExpander;
use crate::retriever::Retriever;
use crate::synthesizer::Synthesizer;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Results fetched per query phrasing.
    pub top_k: u64,
    /// Paraphrases requested from the model per question.
    pub expansions: usize,
    /// Character budget for the synthesized context.
    pub max_context_chars: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            top_k: 4,
            expansions: 5,
            max_context_chars: 24_000,
        }
    }
}

/// The question-answering pipeline: expand, retrieve, synthesize.
pub struct RagEngine<P> {
    expander: QueryExpander<P>,
    retriever: Retriever<P>,
    synthesizer: Synthesizer<P>,
}

impl<P: LlmProvider> RagEngine<P> {
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        options: EngineOptions,
    ) -> Self {
        Self {
            expander: QueryExpander::new(provider.clone(), options.expansions),
            retriever: Retriever::new(provider.clone(), store, collection, options.top_k),
            synthesizer: Synthesizer::new(provider, options.max_context_chars),
        }
    }

    /// Answer one question against the indexed document.
    ///
    /// # Errors
    ///
    /// Any [`RagError`] is fatal for this question only; callers keep going
    /// with the next question.
    pub async fn ask(&self, question: &str) -> Result<String, RagError> {
        let expansion = self.expander.expand(question).await?;
        tracing::debug!(
            queries = expansion.queries.len(),
            summary = %expansion.summary,
            "expanded question"
        );

        let chunks = self
            .retriever
            .retrieve(question, &expansion.queries)
            .await?;
        tracing::debug!(chunks = chunks.len(), "retrieved context");

        self.synthesizer.synthesize(question, &chunks).await
    }
}
