use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// searchbookmarks - Search the bookmarks of every installed browser
#[derive(Parser, Debug)]
#[command(name = "searchbookmarks")]
#[command(about = "Aggregates and searches the bookmarks of installed web browsers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config dir>/searchbookmarks/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search bookmarks once
    Search {
        /// Search terms (all must match)
        #[arg(required = true)]
        terms: Vec<String>,
        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Open the N-th result (1-based) in its browser
        #[arg(short, long)]
        open: Option<usize>,
    },
    /// List known sources and their state
    Sources,
    /// Keep the index live and report every reload
    Watch,
    /// Search as you type, one query per line
    Interactive {
        /// Maximum number of results to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}
