//! Vector index backends and document ingestion for tome.

pub mod document;
pub mod in_memory_store;
#[cfg(feature = "qdrant")]
pub mod qdrant_store;
pub mod vector_store;

pub use in_memory_store::InMemoryVectorStore;
#[cfg(feature = "qdrant")]
pub use qdrant_store::QdrantVectorStore;
pub use vector_store::{Distance, ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};
