use super::TargetArgs;
use crate::cli::output::*;
use crate::core::config::Config;
use crate::core::paths::format_index;
use crate::processing::resume::{ChunkState, ResumeTracker};
use crate::utils::format::format_bytes;
use clap::Args;
use colored::*;
use comfy_table::Cell;
use std::path::Path;

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    pub format: String,
}

fn size_of(path: &Path) -> String {
    std::fs::metadata(path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "-".to_string())
}

pub fn run(args: StatusArgs, config: Config) -> anyhow::Result<()> {
    let layout = args.target.layout(&config)?;
    let ledger = ResumeTracker::new(&layout).ledger()?;

    match args.format.as_str() {
        "json" => {
            let value = serde_json::json!({
                "input": layout.input(),
                "work_dir": layout.work_dir(),
                "completed": ledger.completed(),
                "pending": ledger.pending(),
                "finished": ledger.is_finished(),
                "chunks": ledger.entries,
                "merged": ledger.merged,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        "table" => {
            section_header(&format!("Run status: {}", layout.stem()));

            if ledger.entries.is_empty() {
                warning(&format!(
                    "No chunks in {}; run `boldchunk split` or `boldchunk run` first",
                    layout.chunk_dir().display()
                ));
                return Ok(());
            }

            let mut table = create_standard_table();
            table.set_header(vec![
                header_cell("Chunk"),
                header_cell("State"),
                header_cell("Tabular part"),
                header_cell("Columnar part"),
            ]);
            for entry in &ledger.entries {
                let state = match entry.state {
                    ChunkState::Complete => "complete".green().to_string(),
                    ChunkState::Partial => "partial".yellow().to_string(),
                    ChunkState::Pending => "pending".dimmed().to_string(),
                };
                table.add_row(vec![
                    Cell::new(format_index(entry.index)),
                    Cell::new(state),
                    Cell::new(size_of(&layout.tabular_part_path(entry.index))),
                    Cell::new(size_of(&layout.columnar_part_path(entry.index))),
                ]);
            }
            println!("{}", table);

            let completed = ledger.completed().len();
            tree(&[
                (
                    "Complete",
                    format!("{}/{}", completed, ledger.entries.len()),
                ),
                (
                    "Merged result",
                    match &ledger.merged {
                        Some(path) => format!("{} ({})", path.display(), size_of(path)),
                        None => "not yet written".to_string(),
                    },
                ),
            ]);
        }
        other => anyhow::bail!("Unknown format '{}'; expected table or json", other),
    }

    Ok(())
}
