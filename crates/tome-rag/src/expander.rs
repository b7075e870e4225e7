use std::sync::Arc;

use tome_llm::LlmProvider;

use crate::error::RagError;

/// Parsed expansion output: the model's topic summary plus alternative
/// phrasings of the question.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub summary: String,
    pub queries: Vec<String>,
}

/// Asks the model for paraphrases of a question to widen retrieval recall.
///
/// Distance-based similarity search is sensitive to wording; several
/// rephrasings of the same information need hit chunks a single phrasing
/// would miss.
pub struct QueryExpander<P> {
    provider: Arc<P>,
    count: usize,
}

impl<P: LlmProvider> QueryExpander<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, count: usize) -> Self {
        Self { provider, count }
    }

    /// Expand a question into paraphrased queries.
    ///
    /// The model is asked for a one-paragraph summary followed by `count`
    /// rephrasings, one per line. Whatever number of lines actually comes
    /// back is accepted; a model returning fewer (or none) is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Model`] if the completion call fails.
    pub async fn expand(&self, question: &str) -> Result<Expansion, RagError> {
        let prompt = build_expansion_prompt(question, self.count);
        let output = self
            .provider
            .complete(&prompt)
            .await
            .map_err(RagError::Model)?;
        Ok(parse_expansion(&output))
    }
}

fn build_expansion_prompt(question: &str, count: usize) -> String {
    format!(
        "You are an AI assistant working over a single source document. \
         Your first task is to write a concise one-paragraph summary of the topic \
         the user is asking about. Your second task is to generate {count} different \
         versions of the user's question, each approaching the same information need \
         from a different lexical or semantic angle, to improve recall when \
         retrieving relevant passages from a vector database. Output the summary as \
         the first line, then each alternative question on its own line, with no \
         numbering or extra commentary.\n\
         Original question: {question}"
    )
}

/// First non-empty line is the summary; every later non-empty line is a query.
fn parse_expansion(output: &str) -> Expansion {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let summary = lines.next().unwrap_or_default().to_owned();
    let queries = lines.map(str::to_owned).collect();
    Expansion { summary, queries }
}
