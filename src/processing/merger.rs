//! Fold every columnar part into the run's single result table.

use crate::core::paths::RunLayout;
use crate::storage::table::{concat_tables, drop_duplicate_rows, read_parquet, write_parquet};
use crate::utils::fs::{partial_path, remove_if_exists};
use crate::BoldChunkError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub parts: usize,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output: PathBuf,
}

impl MergeSummary {
    pub fn duplicates_removed(&self) -> usize {
        self.input_rows - self.output_rows
    }
}

pub struct ResultMerger<'a> {
    layout: &'a RunLayout,
}

impl<'a> ResultMerger<'a> {
    pub fn new(layout: &'a RunLayout) -> Self {
        Self { layout }
    }

    /// Concatenate parts in chunk order, drop exact duplicate rows and
    /// write the merged Parquet file.
    pub fn merge(&self) -> Result<MergeSummary, BoldChunkError> {
        let parts = self.layout.existing_columnar_parts()?;
        if parts.is_empty() {
            return Err(BoldChunkError::NoPartsFound {
                dir: self.layout.work_dir().to_path_buf(),
                pattern: self.layout.columnar_part_pattern(),
            });
        }

        let mut tables = Vec::with_capacity(parts.len());
        for (index, path) in &parts {
            let table = read_parquet(path)?;
            debug!("Part {:03}: {} rows", index, table.num_rows());
            tables.push(table);
        }

        let combined = concat_tables(&tables)?;
        let deduped = drop_duplicate_rows(&combined)?;

        let output = self.layout.merged_path();
        let staging = partial_path(&output);
        if let Err(e) = write_parquet(&staging, &deduped) {
            let _ = remove_if_exists(&staging);
            return Err(e);
        }
        std::fs::rename(&staging, &output)?;

        Ok(MergeSummary {
            parts: parts.len(),
            input_rows: combined.num_rows(),
            output_rows: deduped.num_rows(),
            output,
        })
    }
}
