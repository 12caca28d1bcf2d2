pub mod clean;
pub mod config;
pub mod export;
pub mod merge;
pub mod run;
pub mod snapshot;
pub mod split;
pub mod status;

use crate::core::config::Config;
use crate::core::paths::RunLayout;
use clap::Args;
use std::path::PathBuf;

/// Input and run directory, shared by every command that works on a run.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Input FASTA file (plain or .gz)
    #[arg(value_name = "FASTA")]
    pub input: PathBuf,

    /// Run directory [default: <input dir>/boldigger3_data]
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,
}

impl TargetArgs {
    /// Layout for this run; the flag beats the config file.
    pub fn layout(&self, config: &Config) -> crate::Result<RunLayout> {
        let work_dir = self.work_dir.as_deref().or(config.paths.work_dir.as_deref());
        RunLayout::new(&self.input, work_dir)
    }
}
