//! CLI module for Folio.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Folio - Document Question Answering
///
/// A local-first CLI tool for indexing text and PDF files and asking questions about them.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and index one or more .txt or .pdf files
    Add {
        /// Files to add
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Ask a question and get an answer from your documents
    Ask {
        /// The question to ask
        question: String,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search for relevant passages
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List indexed documents
    List,

    /// Remove all documents from the store
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show store location and size
    Status,

    /// Start an interactive question-answering session
    Shell,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "chunking.chunk_size")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
