use boldchunk::cli::{effective_config, Cli, Commands};
use boldchunk::utils::logging;
use boldchunk::BoldChunkError;
use clap::Parser;
use colored::*;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        // Use appropriate exit codes based on error type
        let exit_code = match e.downcast_ref::<BoldChunkError>() {
            Some(BoldChunkError::Config(_)) => 2,
            Some(BoldChunkError::Io(_)) => 3,
            Some(BoldChunkError::Parse(_)) | Some(BoldChunkError::Table(_)) => 4,
            Some(BoldChunkError::ChunkProcessingExhausted { .. }) => 5,
            Some(BoldChunkError::NoPartsFound { .. }) => 6,
            Some(BoldChunkError::EmptyInput(_)) => 7,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = effective_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => boldchunk::cli::commands::run::run(args, config),
        Commands::Split(args) => boldchunk::cli::commands::split::run(args, config),
        Commands::Merge(args) => boldchunk::cli::commands::merge::run(args, config),
        Commands::Status(args) => boldchunk::cli::commands::status::run(args, config),
        Commands::Export(args) => boldchunk::cli::commands::export::run(args, config),
        Commands::Snapshot(args) => boldchunk::cli::commands::snapshot::run(args, config),
        Commands::Clean(args) => boldchunk::cli::commands::clean::run(args, config),
        Commands::Config(args) => boldchunk::cli::commands::config::run(args, config),
    }
}
