use std::collections::HashMap;
use std::sync::Arc;

use tome_llm::LlmProvider;
use tome_store::{ScoredVectorPoint, VectorStore};

use crate::error::RagError;

/// One retrieved chunk with its best observed similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub id: String,
    pub content: String,
    pub source: String,
    pub score: f32,
}

/// Fan-out retriever: searches once per query phrasing and merges the hits.
///
/// One phrasing of a question can miss a chunk that is worded differently in
/// the source; searching every paraphrase costs at most N+1 embedding and
/// search calls per question and buys recall.
pub struct Retriever<P> {
    provider: Arc<P>,
    store: Arc<dyn VectorStore>,
    collection: String,
    top_k: u64,
}

impl<P: LlmProvider> Retriever<P> {
    #[must_use]
    pub fn new(
        provider: Arc<P>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        top_k: u64,
    ) -> Self {
        Self {
            provider,
            store,
            collection: collection.into(),
            top_k,
        }
    }

    /// Search for the original question and every expanded query, merging
    /// results by chunk identity.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::QueryEmbedding`] if a query cannot be embedded and
    /// [`RagError::Store`] if a search fails. Either is fatal for this
    /// question only.
    pub async fn retrieve(
        &self,
        question: &str,
        expanded: &[String],
    ) -> Result<Vec<ScoredChunk>, RagError> {
        let mut hit_lists = Vec::with_capacity(expanded.len() + 1);
        for query in std::iter::once(question).chain(expanded.iter().map(String::as_str)) {
            let vector = self
                .provider
                .embed(query)
                .await
                .map_err(RagError::QueryEmbedding)?;
            let hits = self
                .store
                .search(&self.collection, vector, self.top_k)
                .await?;
            hit_lists.push(hits);
        }
        Ok(merge_hits(hit_lists))
    }
}

/// Dedup by point ID keeping the maximum score, then order by descending
/// score with the ID as tiebreaker so the result is deterministic no matter
/// which query produced which hit.
fn merge_hits(hit_lists: Vec<Vec<ScoredVectorPoint>>) -> Vec<ScoredChunk> {
    let mut best: HashMap<String, ScoredVectorPoint> = HashMap::new();
    for hit in hit_lists.into_iter().flatten() {
        match best.get(&hit.id) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(hit.id.clone(), hit);
            }
        }
    }

    let mut merged: Vec<ScoredChunk> = best
        .into_values()
        .map(|hit| ScoredChunk {
            content: hit
                .payload
                .get("content")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned(),
            source: hit
                .payload
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned(),
            id: hit.id,
            score: hit.score,
        })
        .collect();

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use tome_llm::mock::MockProvider;
    use tome_store::{Distance, InMemoryVectorStore, VectorPoint};

    fn hit(id: &str, score: f32) -> ScoredVectorPoint {
        ScoredVectorPoint {
            id: id.into(),
            score,
            payload: HashMap::from([
                ("content".into(), serde_json_value(&format!("text {id}"))),
                ("source".into(), serde_json_value("doc.pdf")),
            ]),
        }
    }

    fn serde_json_value(s: &str) -> serde_json::Value {
        serde_json::Value::String(s.to_owned())
    }

    #[test]
    fn merge_keeps_maximum_score_per_chunk() {
        let merged = merge_hits(vec![
            vec![hit("a", 0.4), hit("b", 0.9)],
            vec![hit("a", 0.7), hit("c", 0.5)],
        ]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, "b");
        let a = merged.iter().find(|c| c.id == "a").unwrap();
        assert!((a.score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn merge_orders_by_score_then_id() {
        let merged = merge_hits(vec![vec![hit("z", 0.5), hit("a", 0.5), hit("m", 0.8)]]);
        let ids: Vec<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["m", "a", "z"]);
    }

    #[test]
    fn merge_carries_payload_fields() {
        let merged = merge_hits(vec![vec![hit("a", 0.4)]]);
        assert_eq!(merged[0].content, "text a");
        assert_eq!(merged[0].source, "doc.pdf");
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_hits(vec![]).is_empty());
        assert!(merge_hits(vec![vec![], vec![]]).is_empty());
    }

    async fn seeded_store(n: usize) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(Distance::Cosine));
        store.ensure_collection("docs", 2).await.unwrap();
        let points = (0..n)
            .map(|i| VectorPoint {
                id: format!("chunk-{i}"),
                vector: vec![1.0, i as f32],
                payload: HashMap::from([
                    ("content".into(), serde_json_value(&format!("chunk {i}"))),
                    ("source".into(), serde_json_value("doc.pdf")),
                ]),
            })
            .collect();
        store.upsert("docs", points).await.unwrap();
        store
    }

    #[tokio::test]
    async fn many_queries_over_few_chunks_never_duplicate() {
        // 6 expanded queries + the original, store holds only 3 chunks.
        let store = seeded_store(3).await;
        let provider = Arc::new(MockProvider::default().with_embedding(vec![1.0, 0.5]));
        let retriever = Retriever::new(provider, store, "docs", 4);

        let expanded: Vec<String> = (0..6).map(|i| format!("variant {i}")).collect();
        let results = retriever.retrieve("original", &expanded).await.unwrap();

        assert!(results.len() <= 3);
        let mut ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), results.len());
    }

    #[tokio::test]
    async fn respects_top_k_per_query() {
        let store = seeded_store(10).await;
        let provider = Arc::new(MockProvider::default().with_embedding(vec![1.0, 0.5]));
        let retriever = Retriever::new(provider, store, "docs", 4);

        let results = retriever.retrieve("only the original", &[]).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn query_embedding_failure_is_fatal_for_the_question() {
        let store = seeded_store(3).await;
        let provider = Arc::new(MockProvider::default().with_failing_embed_calls(vec![0]));
        let retriever = Retriever::new(provider, store, "docs", 4);

        let result = retriever.retrieve("question", &[]).await;
        assert!(matches!(result, Err(RagError::QueryEmbedding(_))));
    }
}
