use tome_llm::LlmError;
use tome_store::VectorStoreError;

/// Failures while answering one question. None of these abort the batch;
/// the caller reports the question that failed and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("language model request failed: {0}")]
    Model(#[source] LlmError),

    #[error("query embedding failed: {0}")]
    QueryEmbedding(#[source] LlmError),

    #[error("vector store error: {0}")]
    Store(#[from] VectorStoreError),
}
