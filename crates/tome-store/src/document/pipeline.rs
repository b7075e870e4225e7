use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::{Chunk, Document, DocumentError, DocumentLoader, TextSplitter};
use crate::vector_store::{VectorPoint, VectorStore};
use tome_llm::provider::EmbedFuture;

type EmbedFn = Box<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    pub indexed: usize,
    pub skipped: usize,
}

/// Ingestion: split a document, embed each chunk, store the vectors.
pub struct IngestionPipeline {
    splitter: TextSplitter,
    store: Arc<dyn VectorStore>,
    collection: String,
    embed_fn: EmbedFn,
}

impl IngestionPipeline {
    pub fn new(
        splitter: TextSplitter,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
        embed_fn: EmbedFn,
    ) -> Self {
        Self {
            splitter,
            store,
            collection: collection.into(),
            embed_fn,
        }
    }

    /// Ingest a document: split -> embed -> upsert.
    ///
    /// A chunk whose embedding fails is logged and skipped; the rest of the
    /// batch proceeds. Point IDs are minted per run, so re-ingesting the same
    /// source into the same collection appends rather than replaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector store rejects the collection or upsert.
    pub async fn ingest(&self, document: &Document) -> Result<IngestStats, DocumentError> {
        let chunks = self.splitter.split(document);
        if chunks.is_empty() {
            return Ok(IngestStats::default());
        }

        let mut points = Vec::with_capacity(chunks.len());
        let mut skipped = 0;
        for chunk in &chunks {
            match (self.embed_fn)(&chunk.content).await {
                Ok(vector) => points.push(VectorPoint {
                    id: Uuid::new_v4().to_string(),
                    vector,
                    payload: chunk_payload(chunk),
                }),
                Err(e) => {
                    tracing::warn!(
                        chunk_index = chunk.chunk_index,
                        source = %chunk.metadata.source,
                        "skipping chunk, embedding failed: {e}"
                    );
                    skipped += 1;
                }
            }
        }

        if points.is_empty() {
            tracing::warn!(
                collection = %self.collection,
                "no chunk could be embedded, nothing to index"
            );
            return Ok(IngestStats { indexed: 0, skipped });
        }

        let vector_size = u64::try_from(points[0].vector.len()).unwrap_or(0);
        self.store
            .ensure_collection(&self.collection, vector_size)
            .await?;

        let indexed = points.len();
        self.store.upsert(&self.collection, points).await?;

        tracing::info!(
            collection = %self.collection,
            indexed,
            skipped,
            "document indexed"
        );
        Ok(IngestStats { indexed, skipped })
    }

    /// Load a file and ingest it.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or storage fails.
    pub async fn load_and_ingest(
        &self,
        loader: &(dyn DocumentLoader + '_),
        path: &std::path::Path,
    ) -> Result<IngestStats, DocumentError> {
        let document = loader.load(path).await?;
        self.ingest(&document).await
    }
}

fn chunk_payload(chunk: &Chunk) -> HashMap<String, serde_json::Value> {
    HashMap::from([
        ("content".to_owned(), json!(chunk.content)),
        ("source".to_owned(), json!(chunk.metadata.source)),
        (
            "content_type".to_owned(),
            json!(chunk.metadata.content_type),
        ),
        ("chunk_index".to_owned(), json!(chunk.chunk_index)),
        ("page_start".to_owned(), json!(chunk.page_start)),
        ("page_end".to_owned(), json!(chunk.page_end)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentMetadata, SplitterConfig, TextLoader};
    use crate::in_memory_store::InMemoryVectorStore;
    use tome_llm::LlmProvider;
    use tome_llm::mock::MockProvider;

    const COLLECTION: &str = "test_documents";

    fn embed_via(provider: MockProvider) -> EmbedFn {
        Box::new(move |text: &str| {
            let provider = provider.clone();
            let text = text.to_owned();
            Box::pin(async move { provider.embed(&text).await })
        })
    }

    fn pipeline(store: Arc<dyn VectorStore>, provider: MockProvider) -> IngestionPipeline {
        IngestionPipeline::new(
            TextSplitter::new(SplitterConfig::default()),
            store,
            COLLECTION,
            embed_via(provider),
        )
    }

    fn make_doc(content: &str) -> Document {
        Document::from_text(
            content,
            DocumentMetadata {
                source: "test.txt".to_owned(),
                content_type: "text/plain".to_owned(),
            },
        )
    }

    #[tokio::test]
    async fn ingest_single_document() {
        let store = Arc::new(InMemoryVectorStore::default());
        let stats = pipeline(store.clone(), MockProvider::default())
            .ingest(&make_doc("Hello world. This is a test document."))
            .await
            .unwrap();
        assert_eq!(stats.indexed, 1);
        assert_eq!(stats.skipped, 0);

        let results = store.search(COLLECTION, vec![0.1; 8], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn ingest_empty_document_returns_zero() {
        let store = Arc::new(InMemoryVectorStore::default());
        let stats = pipeline(store, MockProvider::default())
            .ingest(&make_doc(""))
            .await
            .unwrap();
        assert_eq!(stats.indexed, 0);
    }

    #[tokio::test]
    async fn failed_chunk_embedding_is_skipped_not_fatal() {
        let store = Arc::new(InMemoryVectorStore::default());
        // 50 chars at size 10 / overlap 0 = 5 chunks; the second embed fails.
        let pipeline = IngestionPipeline::new(
            TextSplitter::new(SplitterConfig {
                chunk_size: 10,
                chunk_overlap: 0,
            }),
            store.clone(),
            COLLECTION,
            embed_via(MockProvider::default().with_failing_embed_calls(vec![1])),
        );

        let stats = pipeline.ingest(&make_doc(&"a".repeat(50))).await.unwrap();
        assert_eq!(stats.indexed, 4);
        assert_eq!(stats.skipped, 1);

        let results = store.search(COLLECTION, vec![0.1; 8], 10).await.unwrap();
        assert_eq!(results.len(), 4);
    }

    #[tokio::test]
    async fn all_embeddings_failing_indexes_nothing() {
        let store = Arc::new(InMemoryVectorStore::default());
        let pipeline = IngestionPipeline::new(
            TextSplitter::new(SplitterConfig::default()),
            store.clone(),
            COLLECTION,
            embed_via(MockProvider::default().with_failing_embed_calls(vec![0])),
        );

        let stats = pipeline.ingest(&make_doc("short doc")).await.unwrap();
        assert_eq!(stats.indexed, 0);
        assert_eq!(stats.skipped, 1);
        assert!(!store.collection_exists(COLLECTION).await.unwrap());
    }

    #[tokio::test]
    async fn reingesting_appends() {
        let store = Arc::new(InMemoryVectorStore::default());
        let pipeline = pipeline(store.clone(), MockProvider::default());
        let doc = make_doc("Same document twice.");

        pipeline.ingest(&doc).await.unwrap();
        pipeline.ingest(&doc).await.unwrap();

        let results = store.search(COLLECTION, vec![0.1; 8], 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn ingested_chunks_have_provenance_payload() {
        let store = Arc::new(InMemoryVectorStore::default());
        pipeline(store.clone(), MockProvider::default())
            .ingest(&make_doc("Some content for payload verification."))
            .await
            .unwrap();

        let results = store.search(COLLECTION, vec![0.1; 8], 1).await.unwrap();
        let payload = &results[0].payload;
        assert_eq!(payload["source"], json!("test.txt"));
        assert_eq!(payload["chunk_index"], json!(0));
        assert_eq!(payload["page_start"], json!(1));
        assert!(
            payload["content"]
                .as_str()
                .unwrap()
                .contains("payload verification")
        );
    }

    #[tokio::test]
    async fn load_and_ingest_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("readme.md");
        std::fs::write(&file, "# Hello\n\nThis is a test markdown file.").unwrap();

        let store = Arc::new(InMemoryVectorStore::default());
        let stats = pipeline(store, MockProvider::default())
            .load_and_ingest(&TextLoader::default(), &file)
            .await
            .unwrap();
        assert_eq!(stats.indexed, 1);
    }
}
