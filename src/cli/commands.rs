//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated document store CLI
#[derive(Parser, Debug)]
#[command(name = "docstore-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Collection endpoint (overrides the config file)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header", global = true)]
    pub headers: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List documents, following continuation tokens
    List {
        /// Path below the endpoint (e.g., "docs")
        #[arg(default_value = "docs")]
        path: String,

        /// Only list one partition
        #[arg(short, long)]
        partition: Option<String>,

        /// Documents per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Resume from a saved continuation token
        #[arg(long)]
        token: Option<String>,
    },

    /// Validate the configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
