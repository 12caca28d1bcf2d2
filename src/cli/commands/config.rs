use crate::cli::output::*;
use crate::core::config::{save_config, Config};
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct ConfigArgs {
    /// Also write the configuration to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs, config: Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(&config)?);

    if let Some(path) = args.output {
        save_config(&path, &config)?;
        success(&format!("Configuration saved to {}", path.display()));
    }
    Ok(())
}
