use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::processing::driver::merge_phase;
use crate::utils::format::format_number;
use crate::utils::logging::RunLog;
use crate::utils::progress::create_spinner;
use clap::Args;

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

pub fn run(args: MergeArgs, config: Config) -> anyhow::Result<()> {
    let layout = args.target.layout(&config)?;
    std::fs::create_dir_all(layout.work_dir())?;
    let mut log = RunLog::open(&layout.log_path())?;

    let spinner = create_spinner("Merging parts");
    let merged = merge_phase(&layout, &mut log);
    spinner.finish_and_clear();
    let summary = merged?;
    success(&format!(
        "Merged {} rows from {} parts into {}",
        format_number(summary.output_rows),
        summary.parts,
        summary.output.display()
    ));
    if summary.duplicates_removed() > 0 {
        info(&format!(
            "Removed {} duplicate rows",
            format_number(summary.duplicates_removed())
        ));
    }
    Ok(())
}
