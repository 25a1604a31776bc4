use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pexels_source::Mode;

/// Request configuration helpers for the Pexels API
#[derive(Parser)]
#[command(name = "pexels-source")]
#[command(about = "Resolve Pexels endpoints, response keys and file variants", long_about = None)]
pub struct Cli {
    /// Settings file (TOML). Defaults to pexels.toml in the user config dir
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Search images or videos
    #[arg(long, global = true)]
    pub mode: Option<Mode>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the search endpoint URL
    Endpoint,
    /// Print the JSON key holding search results
    ResponseKey,
    /// Print the rank of a size name
    Rank {
        size: String,
    },
    /// Pick a link from a JSON list of variants
    Pick {
        /// Size name, original down to tiny
        #[arg(short, long, default_value = "original")]
        size: String,
        /// JSON file with the variants; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Check whether an API key can be found
    Key,
    /// Show the platform context and data directories
    Env,
    /// Run one search and print the picked link of each result
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Size name; defaults to the settings file value
        #[arg(short, long)]
        size: Option<String>,
    },
}
