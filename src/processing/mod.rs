pub mod driver;
pub mod merger;
pub mod processor;
pub mod resume;
pub mod retry;
pub mod splitter;

pub use driver::{ChunkedDriver, RunSummary};
pub use merger::{MergeSummary, ResultMerger};
pub use processor::{ChunkProcessor, ChunkResult};
pub use resume::{ChunkState, Ledger, ResumeTracker};
pub use retry::RetryPolicy;
pub use splitter::{Chunk, ChunkSplitter, SplitOutcome};
