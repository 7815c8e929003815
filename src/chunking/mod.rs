//! Content chunking for breaking document segments into searchable windows.
//!
//! Each raw segment (a page, or a slice of a text file) is split on its own
//! into windows of roughly `chunk_size` characters. Consecutive windows share
//! `chunk_overlap` characters so a sentence cut at a boundary still appears
//! whole in at least one chunk.

use crate::config::ChunkingSettings;
use crate::error::{FolioError, Result};

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    /// Check that the window can always make forward progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FolioError::Config("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(FolioError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

/// A chunk together with its byte range in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// The chunk text, equal to `source[start..end]`.
    pub text: String,
}

/// Overlapping fixed-size window splitter.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: ChunkingConfig,
}

impl TextSplitter {
    /// Create a splitter, rejecting configurations that cannot make progress.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split text into chunk strings.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.spans(text).into_iter().map(|span| span.text).collect()
    }

    /// Split text into chunks, keeping the byte range of each one.
    ///
    /// A window that stops short of the end of the text is pulled back to
    /// the last whitespace in its second half, if there is one. Each chunk is
    /// trimmed of surrounding whitespace and windows holding only whitespace
    /// are skipped.
    pub fn spans(&self, text: &str) -> Vec<ChunkSpan> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let total = chars.len();

        let mut spans = Vec::new();
        let mut start = 0;

        loop {
            let mut end = (start + size).min(total);

            if end < total {
                let floor = start + (size / 2).max(1);
                if let Some(k) = (floor..end).rev().find(|&k| chars[k].is_whitespace()) {
                    end = k + 1;
                }
            }

            let slice = &text[offsets[start]..offsets[end]];
            let trimmed = slice.trim();
            if !trimmed.is_empty() {
                let lead = slice.len() - slice.trim_start().len();
                spans.push(ChunkSpan {
                    start: offsets[start] + lead,
                    end: offsets[start] + lead + trimmed.len(),
                    text: trimmed.to_string(),
                });
            }

            if end == total {
                break;
            }
            start = end.saturating_sub(overlap).max(start + 1);
        }

        spans
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let s = TextSplitter::default();
        assert!(s.split("").is_empty());
        assert!(s.split("   \n\t  ").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let s = TextSplitter::default();
        assert_eq!(s.split("Grass is green."), vec!["Grass is green.".to_string()]);
    }

    #[test]
    fn test_deterministic() {
        let s = TextSplitter::default();
        let text = "The sky is blue. ".repeat(80);
        assert_eq!(s.split(&text), s.split(&text));
    }

    #[test]
    fn test_windows_cover_text_with_overlap() {
        let s = splitter(100, 20);
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(12);
        let spans = s.spans(&text);

        assert!(spans.len() > 1);
        assert_eq!(spans.first().unwrap().start, 0);
        assert_eq!(spans.last().unwrap().end, text.trim_end().len());

        for span in &spans {
            assert_eq!(&text[span.start..span.end], span.text);
            assert!(span.text.chars().count() <= 100);
        }
        for pair in spans.windows(2) {
            // Each window starts inside the previous one: no gaps, and overlap.
            assert!(pair[1].start < pair[0].end);
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_prefers_whitespace_boundaries() {
        let s = splitter(20, 5);
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let spans = s.spans(text);
        assert!(spans.len() > 1);
        // Every chunk except the last stops right before a space.
        for span in &spans[..spans.len() - 1] {
            assert!(text[span.end..].starts_with(' '), "chunk {:?} split a word", span.text);
        }
    }

    #[test]
    fn test_chunks_are_trimmed() {
        let s = splitter(30, 5);
        let text = "\n\n  First paragraph of the page.\n\nSecond paragraph follows here.  \n";
        let spans = s.spans(text);
        assert!(spans.len() > 1);
        for span in &spans {
            assert_eq!(span.text, span.text.trim());
            assert_eq!(&text[span.start..span.end], span.text);
        }
        assert!(spans[0].text.starts_with("First"));
        assert!(spans.last().unwrap().text.ends_with("here."));
    }

    #[test]
    fn test_no_whitespace_only_chunks() {
        let s = splitter(10, 2);
        let text = format!("{}{}{}", "a".repeat(15), " ".repeat(40), "b".repeat(15));
        let chunks = s.split(&text);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
    }

    #[test]
    fn test_multibyte_characters() {
        let s = splitter(7, 2);
        let text = "日本語のテキストを分割します。さらに続く文章。";
        let spans = s.spans(text);
        assert!(spans.len() > 1);
        for span in &spans {
            assert!(span.text.chars().count() <= 7);
            assert_eq!(&text[span.start..span.end], span.text);
        }
        assert_eq!(spans.last().unwrap().end, text.len());
    }

    #[test]
    fn test_invalid_config() {
        assert!(TextSplitter::new(ChunkingConfig { chunk_size: 0, chunk_overlap: 0 }).is_err());
        assert!(TextSplitter::new(ChunkingConfig { chunk_size: 10, chunk_overlap: 10 }).is_err());
        assert!(TextSplitter::new(ChunkingConfig { chunk_size: 10, chunk_overlap: 9 }).is_ok());
    }
}
