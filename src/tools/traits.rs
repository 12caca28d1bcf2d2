/// Trait definitions for the external classifier
///
/// The driver only needs to hand a chunk file to a tool and later find what
/// it wrote, so the seam is small enough to script in tests.
use crate::core::config::ClassificationConfig;
use crate::tools::naming::NamingScheme;
use anyhow::Result;
use std::path::Path;

/// Common interface for per-chunk taxonomic classifiers
pub trait Classifier: Send + Sync {
    /// Run one classification attempt over a chunk file.
    ///
    /// An `Err` marks the attempt as failed. Success of a chunk is judged
    /// from the files the tool leaves behind, not from this return value.
    fn classify(&mut self, chunk: &Path, config: &ClassificationConfig) -> Result<()>;

    /// Verify that the tool is properly installed
    fn verify_installation(&self) -> Result<()>;

    /// Version string reported by the tool
    fn version(&self) -> Result<String>;

    /// Get the name of this classifier
    fn name(&self) -> &str;

    /// Where this tool writes its outputs
    fn naming(&self) -> NamingScheme {
        NamingScheme::boldigger3()
    }
}
