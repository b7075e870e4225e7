use std::path::Path;
use std::pin::Pin;

use super::super::{
    DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader, DocumentMetadata, Page,
};

pub struct PdfLoader {
    pub max_file_size: u64,
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl DocumentLoader for PdfLoader {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>
    {
        let path = path.to_path_buf();
        let max_size = self.max_file_size;
        Box::pin(async move {
            let path = std::fs::canonicalize(&path)?;

            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > max_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }

            let source = path.display().to_string();
            let path_buf = path.clone();
            // pdf-extract is CPU-bound and synchronous
            let content = tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text(&path_buf).map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .await
            .map_err(|e| DocumentError::Io(std::io::Error::other(e)))??;

            Ok(Document {
                pages: split_pages(&content),
                metadata: DocumentMetadata {
                    source,
                    content_type: "application/pdf".to_owned(),
                },
            })
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Split extracted text on form feeds when the extractor emits them;
/// otherwise the whole document counts as one page.
fn split_pages(content: &str) -> Vec<Page> {
    if content.contains('\u{c}') {
        content
            .split('\u{c}')
            .enumerate()
            .map(|(i, text)| Page {
                number: i + 1,
                text: text.to_owned(),
            })
            .collect()
    } else {
        vec![Page {
            number: 1,
            text: content.to_owned(),
        }]
    }
}
