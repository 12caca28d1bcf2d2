//! Scripted stand-in for the external classifier

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use boldchunk::bio::fasta::parse_fasta;
use boldchunk::core::config::ClassificationConfig;
use boldchunk::storage::table::write_parquet;
use boldchunk::tools::naming::{ArtifactKind, NamingScheme};
use boldchunk::tools::traits::Classifier;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// How a scripted failure shows itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Non-zero exit, nothing written
    ExitError,
    /// Clean exit, but the columnar output is missing
    MissingColumnar,
}

/// Classifier that fails a set number of times, then writes plausible
/// outputs under one of the known naming variants.
///
/// The result table holds one row per chunk record with the columns
/// `id`, `species` and `pct_identity`.
#[derive(Debug, Clone)]
pub struct ScriptedClassifier {
    failures_per_chunk: u32,
    failure_mode: FailureMode,
    variant_position: usize,
    calls: Arc<AtomicU32>,
    attempts_on_chunk: u32,
    current_chunk: Option<std::path::PathBuf>,
}

impl Default for ScriptedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            failures_per_chunk: 0,
            failure_mode: FailureMode::ExitError,
            variant_position: 0,
            calls: Arc::new(AtomicU32::new(0)),
            attempts_on_chunk: 0,
            current_chunk: None,
        }
    }

    /// Fail the first `n` attempts on every chunk.
    pub fn failing(mut self, n: u32) -> Self {
        self.failures_per_chunk = n;
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Write outputs under the variant at `position` in the scheme's lists.
    pub fn writing_variant(mut self, position: usize) -> Self {
        self.variant_position = position;
        self
    }

    /// Shared counter of `classify` invocations.
    pub fn calls(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.calls)
    }

    fn write_outputs(&self, chunk: &Path) -> Result<()> {
        let scheme = self.naming();
        let tabular = scheme
            .candidates(ArtifactKind::Tabular, chunk)
            .into_iter()
            .nth(self.variant_position)
            .context("No tabular variant at that position")?;
        let columnar = scheme
            .candidates(ArtifactKind::Columnar, chunk)
            .into_iter()
            .nth(self.variant_position)
            .context("No columnar variant at that position")?;

        let records = parse_fasta(chunk)?;
        let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        if let Some(parent) = tabular.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&tabular, ids.join("\n"))?;

        if self.failure_mode == FailureMode::MissingColumnar
            && self.attempts_on_chunk <= self.failures_per_chunk
        {
            return Ok(());
        }

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("species", DataType::Utf8, true),
            Field::new("pct_identity", DataType::Float64, true),
        ]));
        let species: Vec<String> = ids.iter().map(|id| format!("Taxon {}", id)).collect();
        let identity: Vec<f64> = (0..ids.len()).map(|i| 90.0 + (i % 10) as f64).collect();
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)) as ArrayRef,
                Arc::new(StringArray::from(species)) as ArrayRef,
                Arc::new(Float64Array::from(identity)) as ArrayRef,
            ],
        )?;

        if let Some(parent) = columnar.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_parquet(&columnar, &batch)?;
        Ok(())
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self, chunk: &Path, _config: &ClassificationConfig) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.current_chunk.as_deref() != Some(chunk) {
            self.current_chunk = Some(chunk.to_path_buf());
            self.attempts_on_chunk = 0;
        }
        self.attempts_on_chunk += 1;

        let failing = self.attempts_on_chunk <= self.failures_per_chunk;
        match (failing, self.failure_mode) {
            (true, FailureMode::ExitError) => {
                anyhow::bail!("scripted failure {} on {}", self.attempts_on_chunk, chunk.display())
            }
            _ => self.write_outputs(chunk),
        }
    }

    fn verify_installation(&self) -> Result<()> {
        Ok(())
    }

    fn version(&self) -> Result<String> {
        Ok("scripted 1.0.0".to_string())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn naming(&self) -> NamingScheme {
        NamingScheme::boldigger3()
    }
}
