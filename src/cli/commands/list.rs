//! List command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::store::DocumentStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    print_documents(&store);
    Ok(())
}

pub(super) fn print_documents(store: &DocumentStore) {
    let documents = store.documents();

    if documents.is_empty() {
        Output::info("No documents indexed yet. Use 'folio add <file>' to add content.");
        return;
    }

    Output::header(&format!("Indexed Documents ({})", documents.len()));
    println!();

    for doc in documents {
        Output::document_info(doc);
    }

    println!();
    Output::kv("Total documents", &documents.len().to_string());
    Output::kv("Total chunks", &store.chunk_count().to_string());
}
