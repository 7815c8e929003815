//! Ask command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::{RagEngine, RagResponse};
use anyhow::Result;

/// Run the ask command.
pub fn run_ask(question: &str, top_k: Option<usize>, json: bool, settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;

    let engine = RagEngine::new(&store)
        .with_top_k(top_k.unwrap_or(settings.retrieval.top_k))
        .with_excerpt_chars(settings.retrieval.excerpt_chars);

    let spinner = (!json).then(|| Output::spinner("Searching documents..."));
    let result = engine.answer(question);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let response = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}

/// Print an answer followed by its numbered sources.
pub(super) fn print_response(response: &RagResponse) {
    println!("\n{}\n", response.answer);

    if !response.is_insufficient() {
        Output::header("Sources");
        for (i, source) in response.sources.iter().enumerate() {
            Output::source(i + 1, source);
        }
        println!();
    }
}
