//! Plain text source.

use super::DocumentSource;
use crate::error::Result;
use std::path::Path;

const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Reads UTF-8 text files and cuts them into fixed-length segments.
pub struct TextSource {
    segment_chars: usize,
}

impl TextSource {
    pub fn new(segment_chars: usize) -> Self {
        Self {
            segment_chars: segment_chars.max(1),
        }
    }

    /// Cut text into segments of `segment_chars` characters, dropping
    /// segments that hold only whitespace.
    pub fn segment(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        chars
            .chunks(self.segment_chars)
            .map(|c| c.iter().collect::<String>())
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

impl DocumentSource for TextSource {
    fn format(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &'static [&'static str] {
        TEXT_EXTENSIONS
    }

    fn load_segments(&self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.segment(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_by_character_count() {
        let source = TextSource::new(4);
        assert_eq!(source.segment("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_skips_blank_segments() {
        let source = TextSource::new(3);
        assert_eq!(source.segment("abc      def"), vec!["abc", "def"]);
        assert!(source.segment("").is_empty());
    }

    #[test]
    fn test_multibyte_safe() {
        let source = TextSource::new(2);
        assert_eq!(source.segment("äöüß"), vec!["äö", "üß"]);
    }
}
