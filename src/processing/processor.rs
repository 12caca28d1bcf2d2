//! Run the classifier over one chunk with bounded retries.

use crate::core::config::ClassificationConfig;
use crate::core::paths::{format_index, RunLayout};
use crate::processing::retry::{with_retry, Permanent, RetryPolicy};
use crate::tools::naming::ArtifactKind;
use crate::tools::traits::Classifier;
use crate::utils::fs::{copy_atomic, remove_if_exists};
use crate::utils::logging::RunLog;
use crate::BoldChunkError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Part artifacts of a completed chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub index: usize,
    pub tabular: PathBuf,
    pub columnar: PathBuf,
    pub attempts: u32,
}

pub struct ChunkProcessor<'a> {
    layout: &'a RunLayout,
    config: &'a ClassificationConfig,
    policy: RetryPolicy,
}

impl<'a> ChunkProcessor<'a> {
    pub fn new(layout: &'a RunLayout, config: &'a ClassificationConfig, policy: RetryPolicy) -> Self {
        Self {
            layout,
            config,
            policy,
        }
    }

    /// Classify `chunk` until both outputs show up, then persist them as
    /// the chunk's parts.
    ///
    /// Outputs are looked up after every attempt whatever the exit status.
    /// When every attempt fails no part file is written.
    pub fn process<C: Classifier + ?Sized>(
        &self,
        classifier: &mut C,
        index: usize,
        chunk: &Path,
        log: &mut RunLog,
    ) -> Result<ChunkResult, BoldChunkError> {
        let scheme = classifier.naming();
        let label = format_index(index);
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts_made = 0;

        let outcome = with_retry(
            |attempt| {
                attempts_made = attempt;
                log.line(&format!("Chunk {}: attempt {}/{}", label, attempt, max_attempts))
                    .map_err(Permanent::new)?;

                for stale in scheme.all_candidates(chunk) {
                    if remove_if_exists(&stale).map_err(Permanent::new)? {
                        debug!("Removed stale output {}", stale.display());
                    }
                }

                let run_error = classifier.classify(chunk, self.config).err();

                let tabular = scheme.locate(ArtifactKind::Tabular, chunk);
                let columnar = scheme.locate(ArtifactKind::Columnar, chunk);

                match (tabular, columnar) {
                    (Some((tabular, tv)), Some((columnar, cv))) => {
                        if let Some(err) = run_error {
                            debug!("Outputs present despite tool error: {:#}", err);
                        }
                        debug!(
                            "Chunk {}: tabular via {}, columnar via {}",
                            label,
                            tv.label(),
                            cv.label()
                        );
                        Ok((tabular, columnar))
                    }
                    (tabular, columnar) => {
                        let mut missing = Vec::new();
                        if tabular.is_none() {
                            missing.push(ArtifactKind::Tabular.to_string());
                        }
                        if columnar.is_none() {
                            missing.push(ArtifactKind::Columnar.to_string());
                        }
                        let reason = match run_error {
                            Some(err) => format!("{:#}; missing {} output", err, missing.join(" and ")),
                            None => format!("missing {} output", missing.join(" and ")),
                        };
                        log.line(&format!(
                            "Chunk {}: attempt {}/{} failed: {}",
                            label, attempt, max_attempts, reason
                        ))
                        .map_err(Permanent::new)?;
                        anyhow::bail!(reason)
                    }
                }
            },
            &self.policy,
            &format!("chunk {}", label),
        );

        let (tabular_src, columnar_src) = match outcome {
            Ok(found) => found,
            // Local I/O trouble (run log, scratch cleanup) is not a tool failure
            Err(exhausted) => {
                return Err(match exhausted.last_error.downcast::<Permanent>() {
                    Ok(Permanent(cause)) => match cause.downcast::<std::io::Error>() {
                        Ok(io) => BoldChunkError::Io(io),
                        Err(other) => BoldChunkError::Other(format!("{:#}", other)),
                    },
                    Err(_) => BoldChunkError::ChunkProcessingExhausted {
                        chunk: index,
                        attempts: exhausted.attempts,
                    },
                })
            }
        };

        let tabular = self.layout.tabular_part_path(index);
        let columnar = self.layout.columnar_part_path(index);
        copy_atomic(&tabular_src, &tabular)?;
        copy_atomic(&columnar_src, &columnar)?;

        Ok(ChunkResult {
            index,
            tabular,
            columnar,
            attempts: attempts_made,
        })
    }
}
