//! Folio - Document Question Answering
//!
//! A local-first CLI tool for indexing text and PDF files and answering
//! questions from them with TF-IDF retrieval.
//!
//! # Overview
//!
//! Folio allows you to:
//! - Load `.txt` and `.pdf` files and split them into overlapping chunks
//! - Build a persistent TF-IDF index over every chunk
//! - Ask questions and get extractive answers with cited sources
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `loader` - Document loading (text, PDF)
//! - `chunking` - Character-window text splitting
//! - `vectorizer` - TF-IDF vectorization
//! - `vector_store` - Exact nearest-neighbour index
//! - `store` - Document store and on-disk persistence
//! - `rag` - Answer assembly with sources
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::rag::RagEngine;
//! use folio::store::{DocumentStore, StoreConfig};
//!
//! fn main() -> folio::Result<()> {
//!     let mut store = DocumentStore::open(StoreConfig::new("/tmp/folio-store"))?;
//!     store.add_document("notes.txt", &["The sky is blue."])?;
//!
//!     let response = RagEngine::new(&store).answer("What color is the sky?")?;
//!     println!("{}", response.format_for_display());
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod rag;
pub mod store;
pub mod vector_store;
pub mod vectorizer;

pub use error::{FolioError, Result};
