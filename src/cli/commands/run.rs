use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::processing::ChunkedDriver;
use crate::tools::Boldigger3;
use crate::utils::format::{format_duration, format_number};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Reference database selector
    #[arg(long)]
    pub db: Option<u32>,

    /// Search mode selector
    #[arg(long)]
    pub mode: Option<u32>,

    /// Identity thresholds, comma separated (e.g. 97,95,90,85)
    #[arg(long, value_delimiter = ',')]
    pub thresholds: Option<Vec<u32>>,

    /// Records per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Extra attempts per chunk after the first
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Seconds to wait between attempts
    #[arg(long, value_name = "SECS")]
    pub retry_interval: Option<u64>,

    /// Worker count passed to boldigger3
    #[arg(long)]
    pub workers: Option<usize>,

    /// Path to the boldigger3 binary
    #[arg(long, value_name = "PATH")]
    pub boldigger: Option<PathBuf>,
}

impl RunArgs {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(db) = self.db {
            config.classification.database = db;
        }
        if let Some(mode) = self.mode {
            config.classification.mode = mode;
        }
        if let Some(thresholds) = &self.thresholds {
            config.classification.thresholds = thresholds.clone();
        }
        if let Some(workers) = self.workers {
            config.classification.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunking.chunk_size = chunk_size;
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(interval) = self.retry_interval {
            config.retry.retry_interval_secs = interval;
        }
        if let Some(work_dir) = &self.target.work_dir {
            config.paths.work_dir = Some(work_dir.clone());
        }
        if let Some(boldigger) = &self.boldigger {
            config.paths.boldigger = Some(boldigger.clone());
        }
    }
}

pub fn run(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let layout = args.target.layout(&config)?;
    let log_path = layout.log_path();
    let tool = Boldigger3::locate(config.paths.boldigger.as_deref())?;

    section_header("BOLDigger3 chunked run");
    tree(&[
        ("Input", layout.input().display().to_string()),
        ("Run directory", layout.work_dir().display().to_string()),
        ("Classifier", tool.binary_path().display().to_string()),
        ("Chunk size", format_number(config.chunking.chunk_size)),
        (
            "Attempts per chunk",
            format!(
                "{} ({}s apart)",
                config.retry.max_attempts(),
                config.retry.retry_interval_secs
            ),
        ),
    ]);
    println!();

    let mut driver = ChunkedDriver::new(config, layout, tool)?;
    let summary = match driver.run() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("  Run log: {}", log_path.display());
            return Err(e.into());
        }
    };

    success(&format!(
        "{} chunks done ({} classified, {} already complete) in {}",
        summary.chunks,
        summary.processed,
        summary.skipped,
        format_duration(summary.elapsed.as_secs())
    ));
    if summary.merge.duplicates_removed() > 0 {
        info(&format!(
            "Removed {} duplicate rows while merging",
            format_number(summary.merge.duplicates_removed())
        ));
    }
    success(&format!(
        "Merged {} rows from {} parts into {}",
        format_number(summary.merge.output_rows),
        summary.merge.parts,
        summary.merge.output.display()
    ));
    info(&format!("Run log: {}", log_path.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "boldchunk",
            "run",
            "asv.fasta",
            "--db",
            "2",
            "--thresholds",
            "99,97,95,90",
            "--chunk-size",
            "250",
            "--retry-interval",
            "5",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.classification.database, 2);
        assert_eq!(config.classification.mode, 3);
        assert_eq!(config.classification.thresholds, vec![99, 97, 95, 90]);
        assert_eq!(config.chunking.chunk_size, 250);
        assert_eq!(config.retry.retry_interval_secs, 5);
        assert_eq!(config.retry.max_retries, 3);
    }
}
