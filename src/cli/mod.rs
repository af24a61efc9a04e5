//! CLI module
//!
//! Command-line interface for listing documents.
//!
//! # Commands
//!
//! - `list` - Walk a collection page by page, one JSON line per document
//! - `validate` - Check a configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
