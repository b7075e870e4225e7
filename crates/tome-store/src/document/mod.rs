pub mod error;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod types;

pub use error::DocumentError;
pub use loader::{DocumentLoader, TextLoader, loader_for};
pub use pipeline::{IngestStats, IngestionPipeline};
pub use splitter::{SplitterConfig, TextSplitter};
pub use types::{Chunk, Document, DocumentMetadata, Page};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
