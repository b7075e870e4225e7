//! Retrieval-augmented answering over an indexed document.

pub mod engine;
pub mod error;
pub mod expander;
pub mod retriever;
pub mod synthesizer;

pub use engine::{EngineOptions, RagEngine};
pub use error::RagError;
pub use expander::{Expansion, QueryExpander};
pub use retriever::{Retriever, ScoredChunk};
pub use synthesizer::Synthesizer;
