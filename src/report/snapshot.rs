//! Reproducibility snapshot of a finished (or interrupted) run.
//!
//! Writes `snapshot.json` for machines and `METHODS.md` for a methods
//! section. Nothing in the run directory is modified.

use crate::core::paths::RunLayout;
use crate::report::log_parser::{parse_run_log, RunParams};
use crate::storage::table::parquet_row_count;
use crate::utils::fs::is_nonempty_file;
use crate::BoldChunkError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub project: String,
    pub created_utc: String,
    pub work_dir: PathBuf,
    pub logs: SnapshotLogs,
    pub artifacts: SnapshotArtifacts,
    pub boldigger_params_from_log: Option<RunParams>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLogs {
    pub boldigger: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotArtifacts {
    pub input_fasta: PathBuf,
    pub input_sha256: Option<String>,
    pub chunk_count: usize,
    pub part_count: usize,
    pub boldigger_merged_parquet: PathBuf,
    pub merged_present: bool,
    pub merged_rows: Option<usize>,
    pub merged_sha256: Option<String>,
}

/// Hex SHA-256 of a file, or `None` when it cannot be read.
pub fn sha256_file(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Some(hex::encode(hasher.finalize()))
}

/// Gather everything the snapshot records about `layout`'s run.
pub fn build_snapshot(project: &str, layout: &RunLayout) -> Result<Snapshot, BoldChunkError> {
    let log_path = layout.log_path();
    let params = if log_path.exists() {
        let text = String::from_utf8_lossy(&std::fs::read(&log_path)?).into_owned();
        Some(parse_run_log(&text)).filter(|p| !p.is_empty() || p.version.is_some())
    } else {
        None
    };

    let merged = layout.merged_path();
    let merged_present = is_nonempty_file(&merged);
    let merged_rows = if merged_present {
        Some(parquet_row_count(&merged)?)
    } else {
        None
    };

    Ok(Snapshot {
        project: project.to_string(),
        created_utc: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        work_dir: layout.work_dir().to_path_buf(),
        logs: SnapshotLogs {
            boldigger: log_path.exists().then_some(log_path),
        },
        artifacts: SnapshotArtifacts {
            input_fasta: layout.input().to_path_buf(),
            input_sha256: sha256_file(layout.input()),
            chunk_count: layout.existing_chunks()?.len(),
            part_count: layout.existing_columnar_parts()?.len(),
            merged_sha256: merged_present.then(|| sha256_file(&merged)).flatten(),
            boldigger_merged_parquet: merged,
            merged_present,
            merged_rows,
        },
        boldigger_params_from_log: params,
    })
}

/// Markdown methods summary.
pub fn render_methods(snapshot: &Snapshot) -> String {
    let artifacts = &snapshot.artifacts;
    let mut lines = vec![
        "Project".to_string(),
        format!("- Name: {}", snapshot.project),
        format!("- Run directory: {}", snapshot.work_dir.display()),
        format!("- Snapshot created: {}", snapshot.created_utc),
        String::new(),
        "Pipeline".to_string(),
        "- BOLDigger3 run in chunked mode; parts merged to one parquet.".to_string(),
        String::new(),
        "Key Artifacts".to_string(),
        format!("- Input FASTA: {}", artifacts.input_fasta.display()),
        format!("- Chunks: {}", artifacts.chunk_count),
        format!("- Columnar parts: {}", artifacts.part_count),
        format!(
            "- BOLDigger merged parquet: {}{}",
            artifacts.boldigger_merged_parquet.display(),
            match artifacts.merged_rows {
                Some(rows) => format!(" ({} rows)", rows),
                None => " (not present)".to_string(),
            }
        ),
        String::new(),
        "BOLDigger Settings".to_string(),
    ];

    match &snapshot.boldigger_params_from_log {
        Some(params) => {
            let mut push = |label: &str, value: Option<String>| {
                if let Some(value) = value {
                    lines.push(format!("- {}: {} (from log)", label, value));
                }
            };
            push("Version", params.version.clone());
            push("DB", params.db.map(|v| v.to_string()));
            push("MODE", params.mode.map(|v| v.to_string()));
            push(
                "Thresholds",
                params.thresholds.as_ref().map(|t| {
                    t.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
                }),
            );
            push("Chunk size", params.chunk_size.map(|v| v.to_string()));
            push("Workers", params.workers.map(|v| v.to_string()));
            push("Max retries", params.max_retries.map(|v| v.to_string()));
            push("Retry interval", params.retry_interval.map(|v| format!("{}s", v)));
            push("Run", params.runstamp.clone());
        }
        None => lines.push("- No run log found".to_string()),
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Write `snapshot.json` and `METHODS.md` into `output_dir`.
pub fn write_snapshot(snapshot: &Snapshot, output_dir: &Path) -> Result<(PathBuf, PathBuf), BoldChunkError> {
    std::fs::create_dir_all(output_dir)?;

    let json_path = output_dir.join("snapshot.json");
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| BoldChunkError::Other(format!("Failed to serialize snapshot: {}", e)))?;
    std::fs::write(&json_path, json)?;

    let methods_path = output_dir.join("METHODS.md");
    std::fs::write(&methods_path, render_methods(snapshot))?;

    Ok((json_path, methods_path))
}
