//! Document store: chunk texts, chunk metadata and the vector index, kept in
//! lockstep and persisted together.
//!
//! Row `i` of the index, entry `i` of the metadata and entry `i` of the text
//! sequence always describe the same chunk. Every mutation builds a complete
//! new state off to the side, persists it, and only then replaces the live
//! state, so a failed call leaves both memory and disk as they were.
//!
//! Adding a document refits the vectorizer over the entire corpus and
//! rebuilds the index from scratch. That makes each add O(corpus size); it is
//! the main limit on how large a store can grow.

mod persist;

pub use persist::{StorePaths, FORMAT_VERSION};

use crate::chunking::{ChunkingConfig, TextSplitter};
use crate::config::Settings;
use crate::error::{FolioError, Result};
use crate::vector_store::{FlatIndex, Matrix};
use crate::vectorizer::TfidfVectorizer;
use chrono::{DateTime, Utc};
use persist::SnapshotRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Number of chunks returned by a search when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// Metadata carried by every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Id of the owning document.
    pub document_id: String,
    /// Display name of the owning document.
    pub document_name: String,
    /// Index of the raw segment (page, text slice) the chunk was cut from.
    pub segment_index: usize,
    /// Human-readable citation, `{document_name}:chunk_{segment_index}`.
    pub source_label: String,
}

impl ChunkMetadata {
    pub fn new(document_id: &str, document_name: &str, segment_index: usize) -> Self {
        Self {
            document_id: document_id.to_string(),
            document_name: document_name.to_string(),
            segment_index,
            source_label: format!("{}:chunk_{}", document_name, segment_index),
        }
    }
}

/// A registered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Generated unique id.
    pub id: String,
    /// Display name, usually the file name.
    pub name: String,
    /// Number of chunks the document produced.
    pub chunk_count: usize,
    /// When the document was added.
    pub added_at: DateTime<Utc>,
}

/// A chunk returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Chunk text.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Squared Euclidean distance to the query (lower is more relevant).
    pub score: f32,
}

/// Where the store lives and how it chunks.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the persisted artifacts.
    pub dir: PathBuf,
    /// Chunking parameters.
    pub chunking: ChunkingConfig,
}

impl StoreConfig {
    /// Store in `dir` with default chunking.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            chunking: ChunkingConfig::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            dir: settings.store_dir(),
            chunking: ChunkingConfig::from(&settings.chunking),
        }
    }
}

/// Everything that must change together.
#[derive(Debug, Clone, Default)]
struct Corpus {
    texts: Vec<String>,
    metadata: Vec<ChunkMetadata>,
    documents: Vec<DocumentRecord>,
    vectorizer: TfidfVectorizer,
    index: FlatIndex,
}

impl Corpus {
    fn snapshot(&self) -> SnapshotRef<'_> {
        SnapshotRef {
            documents: &self.documents,
            metadata: &self.metadata,
            texts: &self.texts,
            vectors: self.index.vectors(),
        }
    }

    fn is_aligned(&self) -> bool {
        self.texts.len() == self.metadata.len() && self.metadata.len() == self.index.len()
    }
}

/// Owns the corpus and its on-disk representation.
///
/// Mutating calls take `&mut self`; callers that need shared access must
/// serialize it themselves.
pub struct DocumentStore {
    paths: StorePaths,
    splitter: TextSplitter,
    corpus: Corpus,
}

impl DocumentStore {
    /// Open the store, loading persisted state if all of it is present.
    ///
    /// If any artifact is missing the store starts empty. Artifacts that are
    /// present but inconsistent with each other are an error.
    #[instrument(skip(config), fields(dir = %config.dir.display()))]
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut store = Self::empty(config)?;

        if let Some(snapshot) = persist::load(&store.paths)? {
            let mut vectorizer = TfidfVectorizer::new();
            vectorizer.fit(&snapshot.texts);

            if !snapshot.texts.is_empty() && vectorizer.vocabulary_size() != snapshot.vectors.dim() {
                return Err(FolioError::Persistence(format!(
                    "index dimension {} does not match vocabulary size {}",
                    snapshot.vectors.dim(),
                    vectorizer.vocabulary_size()
                )));
            }

            store.corpus = Corpus {
                texts: snapshot.texts,
                metadata: snapshot.metadata,
                documents: snapshot.documents,
                vectorizer,
                index: FlatIndex::new(),
            };
            store.corpus.index.rebuild(snapshot.vectors);

            info!(
                "Loaded {} documents ({} chunks)",
                store.corpus.documents.len(),
                store.corpus.texts.len()
            );
        } else {
            debug!("No complete store on disk, starting empty");
        }

        Ok(store)
    }

    /// A store bound to `config.dir` that ignores whatever is on disk.
    ///
    /// Useful for clearing a store whose files cannot be loaded.
    pub fn empty(config: StoreConfig) -> Result<Self> {
        Ok(Self {
            paths: StorePaths::new(config.dir),
            splitter: TextSplitter::new(config.chunking)?,
            corpus: Corpus::default(),
        })
    }

    /// Directory holding the persisted artifacts.
    pub fn dir(&self) -> &Path {
        self.paths.dir()
    }

    /// Chunk, vectorize, index and persist a document.
    ///
    /// Returns the new document id. The whole corpus is refit and the index
    /// rebuilt. On error nothing changes, in memory or on disk.
    #[instrument(skip(self, segments), fields(name = %name, segments = segments.len()))]
    pub fn add_document<S: AsRef<str>>(&mut self, name: &str, segments: &[S]) -> Result<String> {
        let document_id = Uuid::new_v4().to_string();

        let mut texts = self.corpus.texts.clone();
        let mut metadata = self.corpus.metadata.clone();

        for (segment_index, segment) in segments.iter().enumerate() {
            for chunk in self.splitter.split(segment.as_ref()) {
                texts.push(chunk);
                metadata.push(ChunkMetadata::new(&document_id, name, segment_index));
            }
        }
        let chunk_count = texts.len() - self.corpus.texts.len();

        let mut vectorizer = TfidfVectorizer::new();
        let vectors = vectorizer.fit_transform(&texts)?;
        let mut documents = self.corpus.documents.clone();
        documents.push(DocumentRecord {
            id: document_id.clone(),
            name: name.to_string(),
            chunk_count,
            added_at: Utc::now(),
        });

        let mut staged = Corpus {
            texts,
            metadata,
            documents,
            vectorizer,
            index: FlatIndex::new(),
        };
        staged.index.rebuild(vectors);
        debug_assert!(staged.is_aligned());

        persist::save(&self.paths, staged.snapshot())?;
        self.corpus = staged;

        info!(
            "Added {} ({} chunks, corpus now {} chunks, dimension {})",
            name,
            chunk_count,
            self.corpus.texts.len(),
            self.corpus.index.dimension()
        );

        Ok(document_id)
    }

    /// Find the chunks closest to `query`, most relevant first.
    ///
    /// An empty store yields an empty result.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        if self.corpus.texts.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.corpus.vectorizer.transform(query)?;
        let neighbors = self.corpus.index.search(&query_vector, top_k)?;

        debug!("Search returned {} hits", neighbors.len());

        Ok(neighbors
            .into_iter()
            .map(|n| SearchHit {
                content: self.corpus.texts[n.row].clone(),
                metadata: self.corpus.metadata[n.row].clone(),
                score: n.distance,
            })
            .collect())
    }

    /// Names of all registered documents.
    pub fn list_documents(&self) -> BTreeSet<String> {
        self.corpus.documents.iter().map(|d| d.name.clone()).collect()
    }

    /// All registered documents, in the order they were added.
    pub fn documents(&self) -> &[DocumentRecord] {
        &self.corpus.documents
    }

    /// Drop every document and delete the persisted files.
    #[instrument(skip(self))]
    pub fn clear_all(&mut self) -> Result<()> {
        self.paths.remove_all()?;
        self.corpus = Corpus::default();
        info!("Cleared document store");
        Ok(())
    }

    /// Number of chunks in the corpus.
    pub fn chunk_count(&self) -> usize {
        self.corpus.texts.len()
    }

    /// Number of rows in the vector index.
    pub fn index_len(&self) -> usize {
        self.corpus.index.len()
    }

    /// Number of chunk metadata entries.
    pub fn metadata_len(&self) -> usize {
        self.corpus.metadata.len()
    }

    /// Size of the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.corpus.vectorizer.vocabulary_size()
    }

    /// Dimension of the indexed vectors.
    pub fn dimension(&self) -> usize {
        self.corpus.index.dimension()
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.corpus.texts.is_empty()
    }

    /// The indexed vectors, row `i` belonging to chunk `i`.
    pub fn vectors(&self) -> &Matrix {
        self.corpus.index.vectors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &Path) -> DocumentStore {
        DocumentStore::open(StoreConfig::new(dir)).unwrap()
    }

    fn assert_aligned(store: &DocumentStore) {
        assert_eq!(store.chunk_count(), store.metadata_len());
        assert_eq!(store.metadata_len(), store.index_len());
    }

    #[test]
    fn test_empty_store_search() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(dir.path());
        assert!(store.is_empty());
        assert!(store.search("anything at all", DEFAULT_TOP_K).unwrap().is_empty());
        assert!(store.list_documents().is_empty());
    }

    #[test]
    fn test_alignment_after_each_add() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());

        store
            .add_document("a.txt", &["The sky is blue. ".repeat(60)])
            .unwrap();
        assert_aligned(&store);
        let after_first = store.chunk_count();
        assert!(after_first > 1);

        store
            .add_document("b.txt", &["Grass is green.", "Roses are red."])
            .unwrap();
        assert_aligned(&store);
        assert_eq!(store.chunk_count(), after_first + 2);

        store.add_document("empty.txt", &["   "]).unwrap();
        assert_aligned(&store);
        assert_eq!(store.chunk_count(), after_first + 2);
    }

    #[test]
    fn test_chunk_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        let id = store
            .add_document("report.pdf", &["page one text", "page two text"])
            .unwrap();

        let hits = store.search("two", 10).unwrap();
        assert_eq!(hits.len(), 2);
        let top = &hits[0];
        assert_eq!(top.content, "page two text");
        assert_eq!(top.metadata.document_id, id);
        assert_eq!(top.metadata.document_name, "report.pdf");
        assert_eq!(top.metadata.segment_index, 1);
        assert_eq!(top.metadata.source_label, "report.pdf:chunk_1");
    }

    #[test]
    fn test_refit_on_add() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());

        store.add_document("a.txt", &["The sky is blue."]).unwrap();
        let vocab_before = store.vocabulary_size();
        let dim_before = store.dimension();
        let first_row_before = store.vectors().row(0).to_vec();

        store.add_document("b.txt", &["Grass is green."]).unwrap();
        assert!(store.vocabulary_size() > vocab_before);
        assert!(store.dimension() > dim_before);
        assert_eq!(store.dimension(), store.vocabulary_size());
        // The first chunk was re-vectorized in the new space.
        assert_ne!(store.vectors().row(0), first_row_before.as_slice());
    }

    #[test]
    fn test_sky_ranks_above_grass() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());

        let sky = "The sky is blue. ".repeat(40);
        assert!(sky.len() > 500);
        store.add_document("A", &[sky]).unwrap();
        store.add_document("B", &["Grass is green."]).unwrap();

        let hits = store.search("What color is the sky?", DEFAULT_TOP_K).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].metadata.document_name, "A");

        let first_b = hits.iter().position(|h| h.metadata.document_name == "B");
        let first_a = hits.iter().position(|h| h.metadata.document_name == "A");
        if let Some(b) = first_b {
            assert!(first_a.unwrap() < b);
        }
        assert!(hits.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn test_top_k_limits() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store
            .add_document("a.txt", &["one fish", "two fish", "red fish", "blue fish", "old fish"])
            .unwrap();

        assert_eq!(store.search("fish", DEFAULT_TOP_K).unwrap().len(), 4);
        assert_eq!(store.search("fish", 100).unwrap().len(), 5);
        assert!(store.search("fish", 0).unwrap().is_empty());
    }

    #[test]
    fn test_restart_gives_identical_results() {
        let dir = tempfile::tempdir().unwrap();
        let query = "what colour is the sky over the green grass";

        let before = {
            let mut store = open(dir.path());
            store.add_document("A", &["The sky is blue. ".repeat(40)]).unwrap();
            store.add_document("B", &["Grass is green.", "Sky and grass."]).unwrap();
            store.search(query, DEFAULT_TOP_K).unwrap()
        };

        let reopened = open(dir.path());
        assert_aligned(&reopened);
        assert_eq!(reopened.list_documents().len(), 2);
        assert_eq!(reopened.search(query, DEFAULT_TOP_K).unwrap(), before);
    }

    #[test]
    fn test_list_documents_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        let first = store.add_document("same.txt", &["first version"]).unwrap();
        let second = store.add_document("same.txt", &["second version"]).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.list_documents().len(), 1);
        assert_eq!(store.documents().len(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.add_document("a.txt", &["some text here"]).unwrap();
        assert!(StorePaths::new(dir.path()).all_exist());

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert!(store.list_documents().is_empty());
        assert!(store.search("text", DEFAULT_TOP_K).unwrap().is_empty());

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert!(!StorePaths::new(dir.path()).all_exist());

        let reopened = open(dir.path());
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_failed_persist_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"occupied").unwrap();

        let mut store = DocumentStore::empty(StoreConfig::new(&blocker)).unwrap();
        let result = store.add_document("a.txt", &["The sky is blue."]);

        assert!(result.is_err());
        assert!(store.is_empty());
        assert!(store.list_documents().is_empty());
        assert_eq!(store.vocabulary_size(), 0);
        assert_aligned(&store);
    }

    #[test]
    fn test_mismatched_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add_document("a.txt", &["alpha beta"]).unwrap();
        }
        let paths = StorePaths::new(dir.path());
        let stale_chunks = std::fs::read(paths.current_generation().unwrap().unwrap().chunks).unwrap();
        {
            let mut store = open(dir.path());
            store.add_document("b.txt", &["gamma delta"]).unwrap();
        }
        std::fs::write(paths.current_generation().unwrap().unwrap().chunks, stale_chunks).unwrap();

        let result = DocumentStore::open(StoreConfig::new(dir.path()));
        assert!(matches!(result, Err(FolioError::Persistence(_))));

        // The files can still be cleared without loading them.
        let mut store = DocumentStore::empty(StoreConfig::new(dir.path())).unwrap();
        store.clear_all().unwrap();
        assert!(open(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_artifact_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add_document("a.txt", &["alpha beta"]).unwrap();
        }
        let live = StorePaths::new(dir.path()).current_generation().unwrap().unwrap();
        std::fs::remove_file(live.index).unwrap();

        let store = open(dir.path());
        assert!(store.is_empty());
        assert!(store.list_documents().is_empty());
    }

    #[test]
    fn test_interrupted_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.add_document("a.txt", &["alpha beta"]).unwrap();
        }
        let live = StorePaths::new(dir.path()).current_generation().unwrap().unwrap();

        // A later save that wrote a new index and then stopped before
        // switching the live snapshot.
        let orphan = dir.path().join(format!("snapshot-{}", Uuid::new_v4()));
        std::fs::create_dir(&orphan).unwrap();
        std::fs::copy(&live.index, orphan.join("index.bin")).unwrap();
        std::fs::write(orphan.join("metadata.json"), b"{\"truncated\":").unwrap();

        let mut store = open(dir.path());
        assert_eq!(store.list_documents(), BTreeSet::from(["a.txt".to_string()]));
        assert_eq!(store.search("alpha", DEFAULT_TOP_K).unwrap()[0].content, "alpha beta");

        store.add_document("b.txt", &["gamma delta"]).unwrap();
        assert!(!orphan.exists());
        assert_eq!(open(dir.path()).list_documents().len(), 2);
    }
}
