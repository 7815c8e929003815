//! Add command implementation.

use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::loader;
use crate::store::DocumentStore;
use anyhow::Result;
use std::path::Path;
use tracing::warn;

/// Run the add command.
pub fn run_add(files: &[String], settings: &Settings) -> Result<()> {
    let mut store = open_store(settings)?;

    let added = add_files(&mut store, files, settings);

    if added == files.len() {
        Output::success(&format!("Added {} document(s)", added));
        Ok(())
    } else {
        anyhow::bail!("{} of {} file(s) could not be added", files.len() - added, files.len())
    }
}

/// Load and index each file, reporting failures without stopping.
///
/// Returns the number of files that were added.
pub(super) fn add_files(store: &mut DocumentStore, files: &[String], settings: &Settings) -> usize {
    let pb = Output::progress_bar(files.len() as u64, "Indexing");
    let mut added = 0;

    for file in files {
        pb.set_message(file.clone());

        match add_file(store, Path::new(file), settings) {
            Ok((name, chunks)) => {
                pb.println(format!("  {} ({} chunks)", name, chunks));
                added += 1;
            }
            Err(e) => {
                warn!("Failed to add {}: {}", file, e);
                pb.suspend(|| Output::error(&format!("{}", e)));
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();
    added
}

fn add_file(store: &mut DocumentStore, path: &Path, settings: &Settings) -> Result<(String, usize)> {
    let document = loader::load_document(path, &settings.loader)?;
    let id = store.add_document(&document.name, document.segments.as_slice())?;

    let chunks = store
        .documents()
        .iter()
        .find(|d| d.id == id)
        .map(|d| d.chunk_count)
        .unwrap_or(0);

    Ok((document.name, chunks))
}
