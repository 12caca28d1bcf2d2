//! Resume state derived from which part files exist.
//!
//! There is no state file: a chunk is complete exactly when both of its part
//! artifacts are present and non-empty.

use crate::core::paths::RunLayout;
use crate::utils::fs::is_nonempty_file;
use crate::BoldChunkError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkState {
    Complete,
    /// Exactly one of the two parts is present
    Partial,
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub index: usize,
    pub chunk: PathBuf,
    pub state: ChunkState,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    pub entries: Vec<LedgerEntry>,
    pub merged: Option<PathBuf>,
}

impl Ledger {
    pub fn completed(&self) -> Vec<usize> {
        self.indices_in(ChunkState::Complete)
    }

    /// Chunks that still need a classifier run, partial ones included.
    pub fn pending(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.state != ChunkState::Complete)
            .map(|e| e.index)
            .collect()
    }

    pub fn is_finished(&self) -> bool {
        !self.entries.is_empty() && self.pending().is_empty()
    }

    fn indices_in(&self, state: ChunkState) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.state == state)
            .map(|e| e.index)
            .collect()
    }
}

pub struct ResumeTracker<'a> {
    layout: &'a RunLayout,
}

impl<'a> ResumeTracker<'a> {
    pub fn new(layout: &'a RunLayout) -> Self {
        Self { layout }
    }

    pub fn state(&self, index: usize) -> ChunkState {
        let tabular = is_nonempty_file(&self.layout.tabular_part_path(index));
        let columnar = is_nonempty_file(&self.layout.columnar_part_path(index));
        match (tabular, columnar) {
            (true, true) => ChunkState::Complete,
            (false, false) => ChunkState::Pending,
            _ => ChunkState::Partial,
        }
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.state(index) == ChunkState::Complete
    }

    /// State of every chunk currently on disk.
    pub fn ledger(&self) -> Result<Ledger, BoldChunkError> {
        let entries = self
            .layout
            .existing_chunks()?
            .into_iter()
            .map(|(index, chunk)| LedgerEntry {
                index,
                chunk,
                state: self.state(index),
            })
            .collect();

        let merged = self.layout.merged_path();
        Ok(Ledger {
            entries,
            merged: is_nonempty_file(&merged).then_some(merged),
        })
    }
}
