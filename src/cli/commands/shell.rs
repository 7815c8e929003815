//! Interactive question-answering shell.

use super::add::add_files;
use super::ask::print_response;
use super::clear::confirm;
use super::list::print_documents;
use super::open_store;
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

const HELP: &str = "\
  <question>        Ask a question about your documents
  :add <path>...    Add one or more files
  :list             List indexed documents
  :clear            Remove all documents
  :help             Show this help
  exit, quit        Leave the shell";

/// One line of shell input.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Ask(String),
    Add(Vec<String>),
    List,
    Clear,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();

        if line.is_empty() {
            return Self::Empty;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Self::Exit;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Self::Ask(line.to_string());
        };

        let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match name {
            "add" => Self::Add(split_args(args)),
            "list" => Self::List,
            "clear" => Self::Clear,
            "help" => Self::Help,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Split arguments on whitespace. Single or double quotes group a path
/// containing spaces; a backslash escapes the next character outside single
/// quotes.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('\''), c) => current.push(c),
            (_, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_arg = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

/// Run the interactive shell.
pub fn run_shell(settings: &Settings) -> Result<()> {
    let mut store = open_store(settings)?;

    println!("\n{}", style("Folio Shell").bold().cyan());
    println!(
        "{}\n",
        style("Type a question, ':help' for commands, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        let command = ShellCommand::parse(&input);
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::Empty => continue,
            ShellCommand::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ShellCommand::Help => println!("{}\n", HELP),
            ShellCommand::List => print_documents(&store),
            ShellCommand::Add(files) if files.is_empty() => {
                Output::warning("Usage: :add <path>...");
            }
            ShellCommand::Add(files) => {
                let added = add_files(&mut store, &files, settings);
                Output::success(&format!("Added {} of {} file(s)", added, files.len()));
            }
            ShellCommand::Clear => {
                if confirm("Remove all documents?")? {
                    match store.clear_all() {
                        Ok(()) => Output::success("All documents removed."),
                        Err(e) => Output::error(&format!("Failed to clear store: {}", e)),
                    }
                }
            }
            ShellCommand::Unknown(name) => {
                Output::warning(&format!("Unknown command ':{}'. Type ':help' for commands.", name));
            }
            ShellCommand::Ask(question) => {
                let engine = RagEngine::new(&store)
                    .with_top_k(settings.retrieval.top_k)
                    .with_excerpt_chars(settings.retrieval.excerpt_chars);

                match engine.answer(&question) {
                    Ok(response) => print_response(&response),
                    Err(e) => Output::error(&format!("Error: {}", e)),
                }
            }
        }
    }

    Ok(())
}
