// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the CLI structure is described by Rust structs and
// enums, and clap generates the parsing, --help and --version from them.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bookmark-analyzer",
    version,
    about = "Receive your browser bookmarks and find out which ones still work",
    long_about = "bookmark-analyzer receives bookmarks from a small browser extension, checks every \
                  URL concurrently, reads each page's title and description, and sorts the results \
                  into active, no-metadata and dead links."
)]
pub struct Cli {
    /// Path to a TOML config file (every key is optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the endpoint the browser extension sends bookmarks to
    ///
    /// Example: bookmark-analyzer serve
    Serve,

    /// Check every bookmark in the snapshot and print the results
    ///
    /// Example: bookmark-analyzer analyze --concurrency 20 --json
    Analyze {
        /// Output results in JSON format instead of tables
        #[arg(long)]
        json: bool,

        /// Maximum number of bookmarks checked at once (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-request timeout in seconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Ask the summarizer to explain each bookmark
        #[arg(long)]
        explain: bool,

        /// Ask the summarizer to suggest how to group the bookmarks
        #[arg(long)]
        organize: bool,
    },

    /// Check a single URL
    ///
    /// Example: bookmark-analyzer probe https://www.rust-lang.org
    Probe {
        /// The URL to check
        url: String,

        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the browser extension as a zip file
    PackageExtension {
        /// Where to write the archive
        #[arg(long, short, default_value = "bookmark_analyzer_extension.zip")]
        output: PathBuf,
    },

    /// Step-by-step interactive mode (runs the endpoint in the background)
    Wizard,
}
