//! Partition the input FASTA into fixed-size chunk files.
//!
//! Record `i` (0-based) goes to chunk `i / chunk_size + 1`. Splitting is
//! done once per run directory: when any chunk file for the input's stem is
//! already present, the existing set is reused as-is.

use crate::bio::fasta::{parse_fasta, write_fasta};
use crate::core::paths::RunLayout;
use crate::utils::fs::{partial_path, remove_if_exists};
use crate::BoldChunkError;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub chunks: Vec<Chunk>,
    /// Records read from the input; `None` when an existing split was reused
    pub records: Option<usize>,
}

impl SplitOutcome {
    pub fn reused(&self) -> bool {
        self.records.is_none()
    }
}

pub struct ChunkSplitter<'a> {
    layout: &'a RunLayout,
    chunk_size: usize,
}

impl<'a> ChunkSplitter<'a> {
    pub fn new(layout: &'a RunLayout, chunk_size: usize) -> Self {
        Self { layout, chunk_size }
    }

    /// Chunk files already on disk, in index order.
    pub fn existing(&self) -> Result<Vec<Chunk>, BoldChunkError> {
        Ok(self
            .layout
            .existing_chunks()?
            .into_iter()
            .map(|(index, path)| Chunk { index, path })
            .collect())
    }

    pub fn split(&self) -> Result<SplitOutcome, BoldChunkError> {
        if self.chunk_size == 0 {
            return Err(BoldChunkError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        let existing = self.existing()?;
        if !existing.is_empty() {
            debug!(
                "Reusing {} chunk files in {}",
                existing.len(),
                self.layout.chunk_dir().display()
            );
            return Ok(SplitOutcome {
                chunks: existing,
                records: None,
            });
        }

        let records = parse_fasta(self.layout.input())?;
        if records.is_empty() {
            return Err(BoldChunkError::EmptyInput(self.layout.input().to_path_buf()));
        }

        self.layout.ensure_dirs()?;

        // No chunk file becomes visible until every chunk is staged.
        let mut staged: Vec<(Chunk, PathBuf)> = Vec::new();
        for (offset, group) in records.chunks(self.chunk_size).enumerate() {
            let index = offset + 1;
            let path = self.layout.chunk_path(index);
            let staging = partial_path(&path);
            if let Err(e) = write_fasta(&staging, group) {
                for (_, leftover) in &staged {
                    let _ = remove_if_exists(leftover);
                }
                let _ = remove_if_exists(&staging);
                return Err(e);
            }
            staged.push((Chunk { index, path }, staging));
        }

        let mut chunks = Vec::with_capacity(staged.len());
        for (chunk, staging) in staged {
            std::fs::rename(&staging, &chunk.path)?;
            chunks.push(chunk);
        }

        Ok(SplitOutcome {
            chunks,
            records: Some(records.len()),
        })
    }
}
