//! RAG response assembly.

use super::{excerpt, ANSWER_LEAD_IN, INSUFFICIENT_INFORMATION};
use crate::error::Result;
use crate::store::{DocumentStore, SearchHit, DEFAULT_TOP_K};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Default excerpt length for sources.
const DEFAULT_EXCERPT_CHARS: usize = 100;

/// A citation for one retrieved chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    /// Name of the document the chunk came from.
    pub document: String,
    /// Chunk text, shortened for display.
    pub excerpt: String,
    /// Human-readable location, e.g. `report.pdf:chunk_3`.
    pub source_label: String,
    /// Distance to the question (lower is more relevant).
    pub score: f32,
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagResponse {
    /// The assembled answer.
    pub answer: String,
    /// One entry per retrieved chunk, in ranked order.
    pub sources: Vec<Source>,
}

impl RagResponse {
    /// The answer given when nothing relevant was found.
    pub fn insufficient() -> Self {
        Self {
            answer: INSUFFICIENT_INFORMATION.to_string(),
            sources: Vec::new(),
        }
    }

    /// Whether retrieval came back empty.
    pub fn is_insufficient(&self) -> bool {
        self.sources.is_empty()
    }

    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        output.push_str("\n\n--- Sources ---\n");
        if self.sources.is_empty() {
            output.push_str("\nNo specific sources were used to generate this answer.");
        }
        for (i, source) in self.sources.iter().enumerate() {
            output.push_str(&format!(
                "\n{}. {} - {} (score: {:.4})\n   Excerpt: {}\n",
                i + 1,
                source.document,
                source.source_label,
                source.score,
                source.excerpt
            ));
        }

        output
    }
}

/// RAG engine for question answering.
///
/// Borrows the store; it never mutates it.
pub struct RagEngine<'a> {
    store: &'a DocumentStore,
    top_k: usize,
    excerpt_chars: usize,
}

impl<'a> RagEngine<'a> {
    /// Create a new RAG engine.
    pub fn new(store: &'a DocumentStore) -> Self {
        Self {
            store,
            top_k: DEFAULT_TOP_K,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
        }
    }

    /// Set the number of chunks retrieved per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the maximum excerpt length shown per source.
    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    /// Answer a question from the stored documents.
    ///
    /// Finding nothing is not an error: the response carries the
    /// insufficient-information answer and no sources.
    #[instrument(skip(self), fields(question = %question))]
    pub fn answer(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let hits = self.store.search(question, self.top_k)?;
        if hits.is_empty() {
            debug!("No relevant chunks found");
            return Ok(RagResponse::insufficient());
        }

        let response = RagResponse {
            answer: compose_answer(&hits),
            sources: self.sources(&hits),
        };

        debug!("Answered with {} sources", response.sources.len());
        Ok(response)
    }

    fn sources(&self, hits: &[SearchHit]) -> Vec<Source> {
        hits.iter()
            .map(|hit| Source {
                document: hit.metadata.document_name.clone(),
                excerpt: excerpt(&hit.content, self.excerpt_chars),
                source_label: hit.metadata.source_label.clone(),
                score: hit.score,
            })
            .collect()
    }
}

/// Concatenate retrieved chunks, in ranked order, behind the lead-in.
fn compose_answer(hits: &[SearchHit]) -> String {
    let context = hits
        .iter()
        .map(|hit| hit.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n{}", ANSWER_LEAD_IN, context)
}
