use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::processing::driver::split_phase;
use crate::utils::format::format_number;
use crate::utils::logging::RunLog;
use clap::Args;

#[derive(Args)]
pub struct SplitArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Records per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

pub fn run(args: SplitArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.chunking.chunk_size = chunk_size;
    }
    config.validate()?;

    let layout = args.target.layout(&config)?;
    std::fs::create_dir_all(layout.work_dir())?;
    let mut log = RunLog::open(&layout.log_path())?;

    let outcome = split_phase(&layout, config.chunking.chunk_size, &mut log)?;
    match outcome.records {
        Some(records) => success(&format!(
            "Split {} records into {} chunks in {}",
            format_number(records),
            outcome.chunks.len(),
            layout.chunk_dir().display()
        )),
        None => warning(&format!(
            "{} chunks already exist in {}; input was not re-split",
            outcome.chunks.len(),
            layout.chunk_dir().display()
        )),
    }
    Ok(())
}
