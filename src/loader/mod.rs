//! Document loading for Folio.
//!
//! Turns a file on disk into a display name plus an ordered list of raw text
//! segments. The store chunks each segment independently, so a segment is
//! the unit that shows up in citations (a page of a PDF, a slice of a text
//! file).

mod pdf;
mod text;

pub use pdf::PdfSource;
pub use text::TextSource;

use crate::config::LoaderSettings;
use crate::error::{FolioError, Result};
use std::path::Path;
use tracing::{debug, instrument};

/// A file read from disk, ready to be added to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// Display name (the file name).
    pub name: String,
    /// Raw text segments in document order.
    pub segments: Vec<String>,
}

/// Trait for document format readers.
pub trait DocumentSource {
    /// Short format name used in log messages.
    fn format(&self) -> &'static str;

    /// Lowercase file extensions this source reads.
    fn extensions(&self) -> &'static [&'static str];

    /// Read the file into raw text segments.
    fn load_segments(&self, path: &Path) -> Result<Vec<String>>;

    /// Check if this source can read the given path.
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions().contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

fn sources(settings: &LoaderSettings) -> Vec<Box<dyn DocumentSource>> {
    vec![
        Box::new(TextSource::new(settings.text_segment_chars)),
        Box::new(PdfSource::new()),
    ]
}

/// Comma-separated list of supported extensions, for error messages.
pub fn supported_extensions() -> String {
    sources(&LoaderSettings::default())
        .iter()
        .flat_map(|s| s.extensions().iter().map(|ext| format!(".{}", ext)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check if the file type is supported.
pub fn is_supported(path: &Path) -> bool {
    detect_source(path, &LoaderSettings::default()).is_some()
}

/// Detect the appropriate source for the given path.
pub fn detect_source(path: &Path, settings: &LoaderSettings) -> Option<Box<dyn DocumentSource>> {
    sources(settings).into_iter().find(|s| s.can_handle(path))
}

/// Load a document from disk.
///
/// Fails with [`FolioError::NotFound`] if the file does not exist and
/// [`FolioError::UnsupportedFormat`] if no source reads its extension.
#[instrument(skip(settings), fields(path = %path.display()))]
pub fn load_document(path: &Path, settings: &LoaderSettings) -> Result<LoadedDocument> {
    if !path.exists() {
        return Err(FolioError::NotFound(path.to_path_buf()));
    }

    let source = detect_source(path, settings).ok_or_else(|| FolioError::UnsupportedFormat {
        path: path.to_path_buf(),
        supported: supported_extensions(),
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let segments = source.load_segments(path)?;
    debug!("Loaded {} as {} ({} segments)", name, source.format(), segments.len());

    Ok(LoadedDocument { name, segments })
}
