use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::report::snapshot::{build_snapshot, write_snapshot};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Project name recorded in the snapshot
    #[arg(long)]
    pub project_name: String,

    /// Destination [default: snapshots/<project name, lowercase>]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: SnapshotArgs, config: Config) -> anyhow::Result<()> {
    let layout = args.target.layout(&config)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("snapshots").join(args.project_name.to_lowercase()));

    let snapshot = build_snapshot(&args.project_name, &layout)?;
    if snapshot.boldigger_params_from_log.is_none() {
        warning(&format!(
            "No parameters recovered from {}",
            layout.log_path().display()
        ));
    }

    let (json_path, methods_path) = write_snapshot(&snapshot, &output_dir)?;
    success(&format!("Snapshot written: {}", output_dir.display()));
    tree(&[
        ("JSON", json_path.display().to_string()),
        ("Methods", methods_path.display().to_string()),
    ]);
    Ok(())
}
