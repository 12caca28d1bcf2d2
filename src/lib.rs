pub mod bio;
pub mod cli;
pub mod core;
pub mod processing;
pub mod report;
pub mod storage;
pub mod tools;
pub mod utils;

pub use crate::core::{config::Config, paths::RunLayout};
pub use crate::processing::driver::{ChunkedDriver, RunSummary};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoldChunkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Table error: {0}")]
    Table(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Input collection is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Chunk {chunk:03} failed after {attempts} attempts")]
    ChunkProcessingExhausted { chunk: usize, attempts: u32 },

    #[error("No part files found in {} matching {pattern}", .dir.display())]
    NoPartsFound { dir: PathBuf, pattern: String },

    #[error("{0}")]
    Other(String),
}

impl From<arrow::error::ArrowError> for BoldChunkError {
    fn from(err: arrow::error::ArrowError) -> Self {
        BoldChunkError::Table(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for BoldChunkError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        BoldChunkError::Table(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoldChunkError>;
