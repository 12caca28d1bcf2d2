//! Split, classify and merge as one resumable run.

use crate::core::config::Config;
use crate::core::paths::{format_index, RunLayout};
use crate::processing::merger::{MergeSummary, ResultMerger};
use crate::processing::processor::ChunkProcessor;
use crate::processing::resume::ResumeTracker;
use crate::processing::retry::RetryPolicy;
use crate::processing::splitter::{ChunkSplitter, SplitOutcome};
use crate::tools::traits::Classifier;
use crate::utils::logging::RunLog;
use crate::utils::progress::create_progress_bar;
use crate::BoldChunkError;
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_stamp: String,
    pub chunks: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Classifier invocations across all processed chunks
    pub attempts: u32,
    pub merge: MergeSummary,
    pub elapsed: Duration,
}

/// Split `layout`'s input and record the outcome in the run log.
pub fn split_phase(
    layout: &RunLayout,
    chunk_size: usize,
    log: &mut RunLog,
) -> Result<SplitOutcome, BoldChunkError> {
    let outcome = ChunkSplitter::new(layout, chunk_size).split()?;
    match outcome.records {
        Some(records) => log.line(&format!(
            "Split: {} records into {} chunks of up to {} in {}",
            records,
            outcome.chunks.len(),
            chunk_size,
            layout.chunk_dir().display()
        ))?,
        None => log.line(&format!(
            "Split: reusing {} existing chunks in {}",
            outcome.chunks.len(),
            layout.chunk_dir().display()
        ))?,
    }
    Ok(outcome)
}

/// Merge every columnar part of `layout` and record the outcome.
pub fn merge_phase(layout: &RunLayout, log: &mut RunLog) -> Result<MergeSummary, BoldChunkError> {
    let summary = ResultMerger::new(layout).merge()?;
    log.line(&format!(
        "Merge: {} parts, {} rows ({} duplicates removed) -> {}",
        summary.parts,
        summary.output_rows,
        summary.duplicates_removed(),
        summary.output.display()
    ))?;
    Ok(summary)
}

pub struct ChunkedDriver<C: Classifier> {
    config: Config,
    layout: RunLayout,
    classifier: C,
    policy: RetryPolicy,
    show_progress: bool,
}

impl<C: Classifier> ChunkedDriver<C> {
    pub fn new(config: Config, layout: RunLayout, classifier: C) -> Result<Self, BoldChunkError> {
        config.validate()?;
        let policy = RetryPolicy::from_config(&config.retry);
        Ok(Self {
            config,
            layout,
            classifier,
            policy,
            show_progress: true,
        })
    }

    /// Replace the retry timing derived from the configuration.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn open_log(&self) -> Result<RunLog, BoldChunkError> {
        Ok(RunLog::open(&self.layout.log_path())?)
    }

    /// Split phase on its own.
    pub fn split(&self) -> Result<SplitOutcome, BoldChunkError> {
        let mut log = self.open_log()?;
        split_phase(&self.layout, self.config.chunking.chunk_size, &mut log)
    }

    /// Merge phase on its own.
    pub fn merge(&self) -> Result<MergeSummary, BoldChunkError> {
        let mut log = self.open_log()?;
        merge_phase(&self.layout, &mut log)
    }

    /// Full run: split once, classify every incomplete chunk in index
    /// order, then merge.
    pub fn run(&mut self) -> Result<RunSummary, BoldChunkError> {
        let started = Instant::now();
        let run_stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        std::fs::create_dir_all(self.layout.work_dir())?;
        let mut log = self.open_log()?;
        log.line(&format!("Run: {}", run_stamp))?;
        log.line(&format!("Input: {}", self.layout.input().display()))?;
        log.line(&self.config.params_line())?;

        self.classifier
            .verify_installation()
            .map_err(|e| BoldChunkError::Tool(format!("{:#}", e)))?;
        match self.classifier.version() {
            Ok(version) => log.line(&format!("boldigger3 version: {}", version))?,
            Err(e) => debug!("Could not read {} version: {:#}", self.classifier.name(), e),
        }
        log.line(&format!("Command: {}", self.config.classification.command_line("<chunk>")))?;

        let split = split_phase(&self.layout, self.config.chunking.chunk_size, &mut log)?;

        let tracker = ResumeTracker::new(&self.layout);
        let processor = ChunkProcessor::new(
            &self.layout,
            &self.config.classification,
            self.policy.clone(),
        );

        let progress = self
            .show_progress
            .then(|| create_progress_bar(split.chunks.len() as u64, "Classifying chunks"));

        let mut processed = 0;
        let mut skipped = 0;
        let mut attempts = 0;
        for chunk in &split.chunks {
            let label = format_index(chunk.index);
            if tracker.is_complete(chunk.index) {
                log.line(&format!("Chunk {}: skipped (already complete)", label))?;
                skipped += 1;
            } else {
                let result =
                    match processor.process(&mut self.classifier, chunk.index, &chunk.path, &mut log) {
                        Ok(result) => result,
                        Err(e) => {
                            if let Some(pb) = &progress {
                                pb.abandon_with_message(format!("Chunk {} failed", label));
                            }
                            if let BoldChunkError::ChunkProcessingExhausted { attempts, .. } = &e {
                                log.line(&format!(
                                    "Chunk {}: failed after {} attempts",
                                    label, attempts
                                ))?;
                            }
                            return Err(e);
                        }
                    };
                log.line(&format!(
                    "Chunk {}: complete ({} attempt{})",
                    label,
                    result.attempts,
                    if result.attempts == 1 { "" } else { "s" }
                ))?;
                processed += 1;
                attempts += result.attempts;
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let merge = merge_phase(&self.layout, &mut log)?;
        let elapsed = started.elapsed();
        log.line(&format!(
            "Done: {} chunks ({} processed, {} skipped) in {}",
            split.chunks.len(),
            processed,
            skipped,
            crate::utils::format::format_duration(elapsed.as_secs())
        ))?;

        Ok(RunSummary {
            run_stamp,
            chunks: split.chunks.len(),
            processed,
            skipped,
            attempts,
            merge,
            elapsed,
        })
    }
}
