#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub source: String,
    pub content_type: String,
}

/// One page of source text. Page numbers are 1-based.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

/// A loaded source file: ordered pages plus provenance. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    pub pages: Vec<Page>,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Build a single-page document from a flat string.
    #[must_use]
    pub fn from_text(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                text: text.into(),
            }],
            metadata,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.is_empty())
    }
}

/// A bounded slice of the document text, the unit of embedding and retrieval.
///
/// `page_start..=page_end` is the approximate 1-based page range the chunk
/// was cut from; `char_start..char_end` are character offsets into the
/// concatenated document text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub chunk_index: usize,
    pub char_start: usize,
    pub char_end: usize,
    pub page_start: usize,
    pub page_end: usize,
    pub metadata: DocumentMetadata,
}
