pub mod commands;
pub mod output;

use crate::core::config::{default_config, load_config, Config};
use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(
    name = "boldchunk",
    version,
    about = "Chunked, resumable BOLDigger3 identification",
    long_about = "boldchunk splits a FASTA file into fixed-size chunks, runs BOLDigger3 on each \
                  chunk with bounded retries, keeps finished chunks across restarts and merges \
                  the per-chunk results into one Parquet table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split, classify every chunk and merge the results
    Run(commands::run::RunArgs),

    /// Only split the input into chunk files
    Split(commands::split::SplitArgs),

    /// Only merge the per-chunk parts
    Merge(commands::merge::MergeArgs),

    /// Show which chunks are complete
    Status(commands::status::StatusArgs),

    /// Convert a Parquet result table to CSV
    Export(commands::export::ExportArgs),

    /// Write snapshot.json and METHODS.md for a run
    Snapshot(commands::snapshot::SnapshotArgs),

    /// Remove chunk files and parts once the merged result exists
    Clean(commands::clean::CleanArgs),

    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
}

/// Configuration from `path`, or the built-in defaults.
pub fn effective_config(path: Option<&Path>) -> crate::Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(default_config()),
    }
}
