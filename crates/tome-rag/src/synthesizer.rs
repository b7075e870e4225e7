use std::sync::Arc;

use tome_llm::LlmProvider;

use crate::error::RagError;
use crate::retriever::ScoredChunk;

/// Binds retrieved chunks into a context-only prompt and asks the model for
/// the final answer.
pub struct Synthesizer<P> {
    provider: Arc<P>,
    max_context_chars: usize,
}

impl<P: LlmProvider> Synthesizer<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, max_context_chars: usize) -> Self {
        Self {
            provider,
            max_context_chars,
        }
    }

    /// Produce an answer grounded in the retrieved chunks.
    ///
    /// Chunks are packed in ranked order until the context budget is spent;
    /// lower-ranked chunks are dropped first, and a top chunk that alone
    /// exceeds the budget is clipped rather than dropped. An empty retrieval
    /// result still goes to the model, which is expected to say the document
    /// has nothing relevant.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Model`] if the completion call fails.
    pub async fn synthesize(
        &self,
        question: &str,
        chunks: &[ScoredChunk],
    ) -> Result<String, RagError> {
        let context = build_context(chunks, self.max_context_chars);
        let prompt = build_answer_prompt(&context, question);
        self.provider.complete(&prompt).await.map_err(RagError::Model)
    }
}

/// Concatenate chunk texts in ranked order, stopping once the next chunk
/// would overrun the character budget. A best chunk larger than the whole
/// budget is clipped so the model always sees the strongest hit.
fn build_context(chunks: &[ScoredChunk], max_chars: usize) -> String {
    let mut context = String::new();
    for chunk in chunks {
        let len = chunk.content.chars().count();
        let used = context.chars().count();
        if used == 0 {
            if len > max_chars {
                return chunk.content.chars().take(max_chars).collect();
            }
        } else if used + 2 + len > max_chars {
            break;
        }
        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str(&chunk.content);
    }
    context
}

fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question using ONLY the following context. Do not use any \
         other knowledge; if the context does not contain the answer, say that \
         the document does not provide one.\n\
         Context: {context}\n\
         Question: {question}\n"
    )
}
