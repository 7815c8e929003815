//! CLI command implementations.

mod add;
mod ask;
mod clear;
mod config;
mod list;
mod search;
mod shell;
mod status;

pub use add::run_add;
pub use ask::run_ask;
pub use clear::run_clear;
pub use config::run_config;
pub use list::run_list;
pub use search::run_search;
pub use shell::run_shell;
pub use status::run_status;

use crate::config::Settings;
use crate::store::{DocumentStore, StoreConfig};
use anyhow::{Context, Result};

/// Open the document store configured in `settings`.
fn open_store(settings: &Settings) -> Result<DocumentStore> {
    let config = StoreConfig::from_settings(settings);
    let dir = config.dir.clone();
    DocumentStore::open(config).with_context(|| format!("Failed to open store at {}", dir.display()))
}
