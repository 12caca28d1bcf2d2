use crate::cli::output::*;
use crate::core::config::Config;
use crate::storage::export::{parquet_to_csv, DEFAULT_EXPORT_BATCH_SIZE};
use crate::utils::format::format_number;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ExportArgs {
    /// Parquet table to convert
    #[arg(value_name = "PARQUET")]
    pub input: PathBuf,

    /// CSV destination [default: input name with a .csv extension]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rows decoded per batch
    #[arg(long, default_value_t = DEFAULT_EXPORT_BATCH_SIZE)]
    pub batch_size: usize,
}

/// `x.parquet.snappy` and `x.parquet` both become `x.csv`.
pub fn default_csv_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_suffix(".parquet.snappy")
        .or_else(|| name.strip_suffix(".parquet"))
        .unwrap_or(&name);
    input.with_file_name(format!("{}.csv", stem))
}

pub fn run(args: ExportArgs, _config: Config) -> anyhow::Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_csv_path(&args.input));

    action(&format!(
        "Exporting {} -> {}",
        args.input.display(),
        output.display()
    ));
    let rows = parquet_to_csv(&args.input, &output, args.batch_size)
        .with_context(|| format!("Failed to export {}", args.input.display()))?;
    success(&format!("Wrote {} rows to {}", format_number(rows), output.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_csv_path() {
        assert_eq!(
            default_csv_path(Path::new("/w/s_identification_result.parquet.snappy")),
            PathBuf::from("/w/s_identification_result.csv")
        );
        assert_eq!(default_csv_path(Path::new("t.parquet")), PathBuf::from("t.csv"));
        assert_eq!(default_csv_path(Path::new("t.pq")), PathBuf::from("t.pq.csv"));
    }
}
