use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::utils::format::format_bytes;
use crate::utils::fs::{is_nonempty_file, remove_if_exists};
use crate::BoldChunkError;
use clap::Args;
use std::path::Path;

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Keep the per-chunk part files
    #[arg(long)]
    pub keep_parts: bool,
}

fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| match e.file_type() {
            Ok(t) if t.is_dir() => dir_size(&e.path()),
            _ => e.metadata().map(|m| m.len()).unwrap_or(0),
        })
        .sum()
}

pub fn run(args: CleanArgs, config: Config) -> anyhow::Result<()> {
    let layout = args.target.layout(&config)?;

    let merged = layout.merged_path();
    if !is_nonempty_file(&merged) {
        return Err(BoldChunkError::Other(format!(
            "Merged result {} not found; refusing to remove intermediates",
            merged.display()
        ))
        .into());
    }

    let mut freed = 0;
    let chunk_dir = layout.chunk_dir();
    if chunk_dir.exists() {
        freed += dir_size(chunk_dir);
        std::fs::remove_dir_all(chunk_dir)?;
        success(&format!("Removed {}", chunk_dir.display()));
    }

    if !args.keep_parts {
        let mut parts = layout.existing_tabular_parts()?;
        parts.extend(layout.existing_columnar_parts()?);
        let count = parts.len();
        for (_, path) in parts {
            freed += std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            remove_if_exists(&path)?;
        }
        success(&format!("Removed {} part files", count));
    }

    info(&format!("Freed {}", format_bytes(freed)));
    info(&format!("Kept {}", merged.display()));
    Ok(())
}
