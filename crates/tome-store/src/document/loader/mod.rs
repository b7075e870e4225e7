mod text;

#[cfg(feature = "pdf")]
mod pdf;

use std::path::Path;
use std::pin::Pin;

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;

use super::{Document, DocumentError};

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &Path,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Document, DocumentError>> + Send + '_>>;

    fn supported_extensions(&self) -> &[&str];
}

/// Pick a loader for the given path by file extension.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] when no loader claims the
/// extension.
pub fn loader_for(path: &Path) -> Result<Box<dyn DocumentLoader>, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    #[cfg(feature = "pdf")]
    if PdfLoader::default().supported_extensions().contains(&ext.as_str()) {
        return Ok(Box::new(PdfLoader::default()));
    }

    let text = TextLoader::default();
    if text.supported_extensions().contains(&ext.as_str()) {
        return Ok(Box::new(text));
    }

    Err(DocumentError::UnsupportedFormat(ext))
}
