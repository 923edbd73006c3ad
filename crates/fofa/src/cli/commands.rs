//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FOFA search bot with a file-backed query cache
#[derive(Parser, Debug)]
#[command(name = "fofa")]
#[command(about = "FOFA search bot with a file-backed query cache", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./fofa.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Telegram bot
    #[cfg(feature = "telegram")]
    Run,

    /// Run one search through the cache and print the result file
    Search {
        /// FOFA query expression
        query: String,
    },

    /// Show the most recent cached queries
    History {
        /// Maximum number of records to display
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Write a configuration template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
