//! Command-line argument parsing
//!
//! Supports:
//! - Parsing a snippet body and printing its tab stops
//! - Expanding the snippet whose prefix ends a piece of text

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Snippet template engine
#[derive(Parser, Debug)]
#[command(name = "token-snippets", version, about = "Snippet template engine")]
pub struct CliArgs {
    /// Config file (defaults to ~/.config/token-snippets/config.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse a snippet body and print the template as JSON
    Parse {
        /// Snippet body, e.g. 'fn ${1:name}() {\n\t$0\n}'
        body: String,
    },
    /// Expand the snippet whose prefix ends TEXT and print the result as JSON
    Expand {
        /// VSCode-style snippet JSON file (repeatable, added to configured files)
        #[arg(short, long, value_name = "FILE")]
        snippets: Vec<PathBuf>,

        /// Variable value as NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Document text; the cursor is placed at its end
        text: String,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}
