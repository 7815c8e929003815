//! Search command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub fn run_search(query: &str, top_k: Option<usize>, settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);

    let results = store.search(query, top_k)?;

    if results.is_empty() {
        Output::info("No results found.");
        return Ok(());
    }

    Output::header(&format!("Search Results ({} found)", results.len()));

    for (i, hit) in results.iter().enumerate() {
        Output::search_result(i + 1, &hit.metadata.source_label, hit.score, &hit.content);
    }

    println!();
    Ok(())
}
