//! Question answering over the document store.
//!
//! Answers are assembled from retrieved chunk text; nothing is generated.

mod response;

pub use response::{RagEngine, RagResponse, Source};

/// Answer returned when retrieval finds nothing.
pub const INSUFFICIENT_INFORMATION: &str =
    "I don't have enough information to answer that question based on the documents provided.";

/// Sentence placed in front of the retrieved text.
pub const ANSWER_LEAD_IN: &str = "Based on the documents, I found the following information:";

/// Marker appended to shortened excerpts.
pub const ELLIPSIS: &str = "...";

/// Shorten `content` to at most `max_chars` characters, appending an
/// ellipsis when anything was cut.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], ELLIPSIS),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_content_untouched() {
        assert_eq!(excerpt("short", 100), "short");
        let exactly = "x".repeat(100);
        assert_eq!(excerpt(&exactly, 100), exactly);
    }

    #[test]
    fn test_excerpt_truncates_with_ellipsis() {
        let long = "y".repeat(150);
        let cut = excerpt(&long, 100);
        assert_eq!(cut, format!("{}...", "y".repeat(100)));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("äöüäöü", 3), "äöü...");
    }
}
