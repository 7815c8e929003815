//! PDF source.

use super::DocumentSource;
use crate::error::{FolioError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::warn;

const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Extracts text from PDF files, one segment per page.
///
/// Pages without extractable text (scans, blank pages) are skipped. Each
/// segment is prefixed with its 1-based page number.
pub struct PdfSource;

impl PdfSource {
    pub fn new() -> Self {
        Self
    }

    /// Turn per-page text into labelled segments.
    pub fn label_pages(pages: Vec<String>) -> Vec<String> {
        pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| format!("[Page {}] {}", i + 1, text))
            .collect()
    }
}

impl Default for PdfSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for PdfSource {
    fn format(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &'static [&'static str] {
        PDF_EXTENSIONS
    }

    fn load_segments(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path)?;

        // pdf-extract panics on some malformed fonts and encodings instead of
        // returning an error.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        }))
        .map_err(|payload| {
            FolioError::Extraction(format!("{}: {}", path.display(), panic_message(&*payload)))
        })?
        .map_err(|e| FolioError::Extraction(format!("{}: {}", path.display(), e)))?;

        let segments = Self::label_pages(pages);
        if segments.is_empty() {
            warn!(
                "{} contains no extractable text (image-based or encrypted?)",
                path.display()
            );
        }
        Ok(segments)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "PDF parser panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_pages_skips_empty() {
        let pages = vec![
            "Introduction".to_string(),
            "   \n".to_string(),
            "Conclusion".to_string(),
        ];
        assert_eq!(
            PdfSource::label_pages(pages),
            vec!["[Page 1] Introduction", "[Page 3] Conclusion"]
        );
    }

    /// A one-page PDF showing "Hello world" in a Type1 font with the given
    /// `/Encoding` name, with a correct cross-reference table.
    fn minimal_pdf(encoding: &str) -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 720 Td (Hello world) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
                .to_string(),
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /{} >>",
                encoding
            ),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_reads_page_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.pdf");
        std::fs::write(&path, minimal_pdf("WinAnsiEncoding")).unwrap();

        let segments = PdfSource::new().load_segments(&path).unwrap();
        assert_eq!(segments.len(), 1);
        assert!(segments[0].starts_with("[Page 1] "));
        assert!(segments[0].contains("Hello world"));
    }

    #[test]
    fn test_parser_panic_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd-font.pdf");
        std::fs::write(&path, minimal_pdf("BogusEncoding")).unwrap();

        let err = PdfSource::new().load_segments(&path).unwrap_err();
        match err {
            FolioError::Extraction(msg) => assert!(msg.contains("odd-font.pdf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_pdf_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let err = PdfSource::new().load_segments(&path).unwrap_err();
        assert!(matches!(err, FolioError::Extraction(_)));
    }
}
