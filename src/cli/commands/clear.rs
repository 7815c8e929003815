//! Clear command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::{DocumentStore, StoreConfig};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the clear command.
///
/// The store is not loaded first, so a store whose files are damaged can
/// still be cleared.
pub fn run_clear(yes: bool, settings: &Settings) -> Result<()> {
    let mut store = DocumentStore::empty(StoreConfig::from_settings(settings))?;

    if !yes && !confirm(&format!("Remove all documents from {}?", store.dir().display()))? {
        Output::info("Aborted.");
        return Ok(());
    }

    store.clear_all()?;
    Output::success("All documents removed.");
    Ok(())
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is a no.
pub(super) fn confirm(prompt: &str) -> Result<bool> {
    print!("{} {} ", prompt, style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
