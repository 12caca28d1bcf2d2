pub mod log_parser;
pub mod snapshot;

pub use log_parser::{parse_run_log, RunParams};
pub use snapshot::{build_snapshot, write_snapshot, Snapshot};
