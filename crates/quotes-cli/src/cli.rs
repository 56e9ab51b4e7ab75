use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quotes")]
#[command(about = "Collect, filter, and sync quotes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Quote server endpoint (overrides QUOTES_SERVER_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub server_url: Option<String>,

    /// Never contact the quote server
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new quote
    #[command(alias = "new")]
    Add {
        /// Quote text (read from stdin when omitted)
        text: Vec<String>,
        /// Quote category
        #[arg(short, long)]
        category: String,
    },
    /// List quotes
    List {
        /// Only show quotes in this category (remembered as the selection)
        #[arg(short, long)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a random quote from the selected category
    Random {
        /// Select this category first (remembered as the selection)
        #[arg(short, long)]
        category: Option<String>,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List categories, marking the selected one
    Categories,
    /// Import quotes from a JSON file
    Import {
        /// JSON file containing an array of quotes
        path: PathBuf,
    },
    /// Export all quotes as JSON
    Export {
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Sync with the quote server
    Sync {
        /// Keep syncing periodically until interrupted
        #[arg(long)]
        watch: bool,
        /// Seconds between syncs in watch mode (overrides QUOTES_SYNC_INTERVAL_SECS)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Review quotes overwritten by the server during sync
    Review {
        #[command(subcommand)]
        command: Option<ReviewCommands>,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// List quotes resolved in favor of the server
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep the server's versions and clear the review flags
    AcceptRemote,
    /// Delete the overwritten quotes (previous local text is not recoverable)
    AcceptLocal,
}
