//! Deterministic on-disk layout of a chunked run.
//!
//! Every artifact of a run is addressed by the input's stem and a 1-based
//! chunk index, so the state of a run can be recovered from the filesystem
//! alone. Indices are zero-padded to three digits; larger indices simply
//! widen, and all ordering goes through the parsed number.

use crate::BoldChunkError;
use std::path::{Path, PathBuf};

/// Default run directory name, created next to the input file.
pub const DEFAULT_WORK_DIR_NAME: &str = "boldigger3_data";
/// Sub-directory holding the chunk FASTA files.
pub const CHUNK_DIR_NAME: &str = "chunks";
/// Append-only run log name.
pub const RUN_LOG_NAME: &str = "boldigger3_chunked.log";

const CHUNK_INFIX: &str = "_chunk_";
const CHUNK_SUFFIX: &str = ".fasta";
const TABULAR_PART_INFIX: &str = "_bold_results_part_";
const TABULAR_PART_SUFFIX: &str = ".xlsx";
const COLUMNAR_PART_INFIX: &str = "_identification_result_part_";
const COLUMNAR_PART_SUFFIX: &str = ".parquet.snappy";
const MERGED_SUFFIX: &str = "_identification_result.parquet.snappy";

const FASTA_EXTENSIONS: &[&str] = &[".fasta", ".fa", ".fna", ".fas", ".fsa"];

/// Format a chunk index the way every file name carries it.
pub fn format_index(index: usize) -> String {
    format!("{:03}", index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    input: PathBuf,
    stem: String,
    work_dir: PathBuf,
    chunk_dir: PathBuf,
}

impl RunLayout {
    /// Build the layout for `input`, rooted at `work_dir` or at
    /// `<input dir>/boldigger3_data` when none is given.
    pub fn new(input: &Path, work_dir: Option<&Path>) -> Result<Self, BoldChunkError> {
        let stem = input_stem(input).ok_or_else(|| {
            BoldChunkError::Config(format!("Cannot derive a run name from {}", input.display()))
        })?;

        // Absolute, since the classifier runs with the chunk directory as cwd.
        let input = std::path::absolute(input)?;
        let work_dir = match work_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
                .join(DEFAULT_WORK_DIR_NAME),
        };
        let chunk_dir = work_dir.join(CHUNK_DIR_NAME);

        Ok(Self {
            input,
            stem,
            work_dir,
            chunk_dir,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn chunk_dir(&self) -> &Path {
        &self.chunk_dir
    }

    /// Create the run and chunk directories.
    pub fn ensure_dirs(&self) -> Result<(), BoldChunkError> {
        std::fs::create_dir_all(&self.chunk_dir)?;
        Ok(())
    }

    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.chunk_dir.join(format!(
            "{}{}{}{}",
            self.stem,
            CHUNK_INFIX,
            format_index(index),
            CHUNK_SUFFIX
        ))
    }

    pub fn tabular_part_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!(
            "{}{}{}{}",
            self.stem,
            TABULAR_PART_INFIX,
            format_index(index),
            TABULAR_PART_SUFFIX
        ))
    }

    pub fn columnar_part_path(&self, index: usize) -> PathBuf {
        self.work_dir.join(format!(
            "{}{}{}{}",
            self.stem,
            COLUMNAR_PART_INFIX,
            format_index(index),
            COLUMNAR_PART_SUFFIX
        ))
    }

    pub fn merged_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}{}", self.stem, MERGED_SUFFIX))
    }

    pub fn log_path(&self) -> PathBuf {
        self.work_dir.join(RUN_LOG_NAME)
    }

    pub fn chunk_pattern(&self) -> String {
        pattern_in(&self.chunk_dir, &self.stem, CHUNK_INFIX, CHUNK_SUFFIX)
    }

    pub fn columnar_part_pattern(&self) -> String {
        pattern_in(&self.work_dir, &self.stem, COLUMNAR_PART_INFIX, COLUMNAR_PART_SUFFIX)
    }

    pub fn tabular_part_pattern(&self) -> String {
        pattern_in(&self.work_dir, &self.stem, TABULAR_PART_INFIX, TABULAR_PART_SUFFIX)
    }

    /// Chunk files already on disk, in index order.
    pub fn existing_chunks(&self) -> Result<Vec<(usize, PathBuf)>, BoldChunkError> {
        self.indexed_matches(&self.chunk_pattern(), CHUNK_INFIX, CHUNK_SUFFIX)
    }

    /// Columnar part files already on disk, in index order.
    pub fn existing_columnar_parts(&self) -> Result<Vec<(usize, PathBuf)>, BoldChunkError> {
        self.indexed_matches(
            &self.columnar_part_pattern(),
            COLUMNAR_PART_INFIX,
            COLUMNAR_PART_SUFFIX,
        )
    }

    /// Tabular part files already on disk, in index order.
    pub fn existing_tabular_parts(&self) -> Result<Vec<(usize, PathBuf)>, BoldChunkError> {
        self.indexed_matches(
            &self.tabular_part_pattern(),
            TABULAR_PART_INFIX,
            TABULAR_PART_SUFFIX,
        )
    }

    fn indexed_matches(
        &self,
        pattern: &str,
        infix: &str,
        suffix: &str,
    ) -> Result<Vec<(usize, PathBuf)>, BoldChunkError> {
        let entries = glob::glob(pattern)
            .map_err(|e| BoldChunkError::Other(format!("Invalid pattern {}: {}", pattern, e)))?;

        let mut found = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| BoldChunkError::Io(e.into()))?;
            let index = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| parse_index(name, &self.stem, infix, suffix));
            if let Some(index) = index {
                found.push((index, path));
            }
        }

        found.sort_by_key(|(index, _)| *index);
        Ok(found)
    }
}

/// Strip the directory and any FASTA/gzip extension from `input`.
fn input_stem(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_str()?;
    let name = name.strip_suffix(".gz").unwrap_or(name);
    let stem = FASTA_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name);

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

fn pattern_in(dir: &Path, stem: &str, infix: &str, suffix: &str) -> String {
    let dir = glob::Pattern::escape(&dir.to_string_lossy());
    let stem = glob::Pattern::escape(stem);
    format!("{}/{}{}*{}", dir, stem, infix, suffix)
}

fn parse_index(file_name: &str, stem: &str, infix: &str, suffix: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(stem)?
        .strip_prefix(infix)?
        .strip_suffix(suffix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_work_dir_is_beside_input() {
        let layout = RunLayout::new(Path::new("/data/run/dna-sequences.fasta"), None).unwrap();
        assert_eq!(layout.stem(), "dna-sequences");
        assert_eq!(layout.work_dir(), Path::new("/data/run/boldigger3_data"));
        assert_eq!(
            layout.chunk_dir(),
            Path::new("/data/run/boldigger3_data/chunks")
        );
    }

    #[test]
    fn test_relative_paths_are_made_absolute() {
        let cwd = std::env::current_dir().unwrap();

        let layout = RunLayout::new(Path::new("asv.fasta"), None).unwrap();
        assert_eq!(layout.input(), cwd.join("asv.fasta"));
        assert_eq!(layout.work_dir(), cwd.join("boldigger3_data"));
        assert!(layout.chunk_path(1).is_absolute());

        let layout = RunLayout::new(Path::new("asv.fasta"), Some(Path::new("scratch/run"))).unwrap();
        assert_eq!(layout.work_dir(), cwd.join("scratch/run"));
    }

    #[test]
    fn test_artifact_names_carry_padded_index() {
        let layout = RunLayout::new(Path::new("reads.fa.gz"), Some(Path::new("/w"))).unwrap();
        assert_eq!(layout.stem(), "reads");
        assert_eq!(layout.chunk_path(7), Path::new("/w/chunks/reads_chunk_007.fasta"));
        assert_eq!(
            layout.tabular_part_path(12),
            Path::new("/w/reads_bold_results_part_012.xlsx")
        );
        assert_eq!(
            layout.columnar_part_path(1),
            Path::new("/w/reads_identification_result_part_001.parquet.snappy")
        );
        assert_eq!(
            layout.merged_path(),
            Path::new("/w/reads_identification_result.parquet.snappy")
        );
        assert_eq!(layout.log_path(), Path::new("/w/boldigger3_chunked.log"));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("s_chunk_004.fasta", "s", CHUNK_INFIX, CHUNK_SUFFIX), Some(4));
        assert_eq!(parse_index("s_chunk_1200.fasta", "s", CHUNK_INFIX, CHUNK_SUFFIX), Some(1200));
        assert_eq!(parse_index("s_chunk_.fasta", "s", CHUNK_INFIX, CHUNK_SUFFIX), None);
        assert_eq!(parse_index("s_chunk_0a1.fasta", "s", CHUNK_INFIX, CHUNK_SUFFIX), None);
        assert_eq!(parse_index("t_chunk_001.fasta", "s", CHUNK_INFIX, CHUNK_SUFFIX), None);
    }

    #[test]
    fn test_existing_chunks_sorted_numerically() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(Path::new("in.fasta"), Some(dir.path())).unwrap();
        layout.ensure_dirs().unwrap();

        for index in [1000, 2, 10, 1] {
            std::fs::write(layout.chunk_path(index), b">a\nA\n").unwrap();
        }
        std::fs::write(layout.chunk_dir().join("other_chunk_003.fasta"), b">a\nA\n").unwrap();

        let indices: Vec<usize> = layout
            .existing_chunks()
            .unwrap()
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![1, 2, 10, 1000]);
    }

    #[test]
    fn test_merged_file_is_not_a_part() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::new(Path::new("in.fasta"), Some(dir.path())).unwrap();
        layout.ensure_dirs().unwrap();
        std::fs::write(layout.merged_path(), b"x").unwrap();
        std::fs::write(layout.columnar_part_path(3), b"x").unwrap();

        let parts = layout.existing_columnar_parts().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].0, 3);
    }

    #[test]
    fn test_unnamed_input_rejected() {
        assert!(RunLayout::new(Path::new(".fasta"), None).is_err());
    }
}
