//! Status command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the status command.
pub fn run_status(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;

    Output::header("Folio Status");
    Output::kv("Store", &store.dir().display().to_string());
    Output::kv("Documents", &store.documents().len().to_string());
    Output::kv("Chunks", &store.chunk_count().to_string());
    Output::kv("Vocabulary", &store.vocabulary_size().to_string());
    Output::kv(
        "Chunking",
        &format!(
            "{} chars, {} overlap",
            settings.chunking.chunk_size, settings.chunking.chunk_overlap
        ),
    );
    println!();

    Ok(())
}
