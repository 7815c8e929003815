//! CLI output formatting utilities.

use crate::rag::Source;
use crate::store::DocumentRecord;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print document info.
    pub fn document_info(doc: &DocumentRecord) {
        println!(
            "  {} {} ({}, {} chunks, added {})",
            style("*").cyan(),
            style(&doc.name).bold(),
            style(&doc.id).dim(),
            doc.chunk_count,
            doc.added_at.format("%Y-%m-%d %H:%M")
        );
    }

    /// Print a search result.
    pub fn search_result(rank: usize, label: &str, score: f32, content: &str) {
        println!(
            "\n{} {} {} (score: {:.4})",
            style(format!("{}.", rank)).green(),
            style(label).bold(),
            style(">>").dim(),
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Print a numbered source citation.
    pub fn source(rank: usize, source: &Source) {
        println!(
            "  {} {} - {}",
            style(format!("{}.", rank)).cyan(),
            style(&source.document).bold(),
            style(&source.source_label).dim()
        );
        println!("     Excerpt: {}", source.excerpt.replace('\n', " "));
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Flatten newlines and truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    crate::rag::excerpt(&content.replace('\n', " "), max_chars)
}
