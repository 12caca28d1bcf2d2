#![allow(dead_code)]

mod classifier;

pub use classifier::{FailureMode, ScriptedClassifier};

use arrow::array::{ArrayRef, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use assert_cmd::Command;
use boldchunk::core::config::Config;
use boldchunk::storage::table::read_parquet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// FASTA text with `n` records named `ASV_0000`, `ASV_0001`, ...
pub fn create_asv_fasta(n: usize) -> String {
    let bases = ['A', 'C', 'G', 'T'];
    let mut content = String::new();
    for i in 0..n {
        content.push_str(&format!(">ASV_{:04} size={}\n", i, n - i));
        let seq: String = (0..40 + i % 7).map(|j| bases[(i * 5 + j * 3) % 4]).collect();
        content.push_str(&seq);
        content.push('\n');
    }
    content
}

pub fn write_input(dir: &Path, name: &str, n: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, create_asv_fasta(n)).expect("write input");
    path
}

/// Defaults with a given chunk size and retry budget.
pub fn test_config(chunk_size: usize, max_retries: u32) -> Config {
    let mut config = Config::default();
    config.chunking.chunk_size = chunk_size;
    config.retry.max_retries = max_retries;
    config.retry.retry_interval_secs = 1;
    config
}

/// Values of the `id` column of a Parquet file, in row order.
pub fn read_ids(path: &Path) -> Vec<String> {
    let table = read_parquet(path).expect("read parquet");
    let index = table.schema().index_of("id").expect("id column");
    table
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("utf8 ids")
        .iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

/// Single-column table of identifiers with a species label.
pub fn id_table(ids: &[&str]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("species", DataType::Utf8, true),
    ]));
    let species: Vec<String> = ids.iter().map(|id| format!("Taxon {}", id)).collect();
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids.to_vec())) as ArrayRef,
            Arc::new(StringArray::from(species)) as ArrayRef,
        ],
    )
    .expect("build table")
}

pub fn boldchunk_cmd() -> Command {
    Command::cargo_bin("boldchunk").expect("binary builds")
}

/// Shell stand-in for boldigger3 that copies `parquet` into the data-dir
/// naming variant for every chunk it is given.
#[cfg(unix)]
pub fn fake_boldigger(dir: &Path, parquet: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("boldigger3");
    let body = format!(
        r#"#!/bin/sh
if [ "$1" = "--version" ]; then
  echo "boldigger3 2.1.3"
  exit 0
fi
chunk="$2"
[ -f "$chunk" ] || exit 1
out="$(dirname "$chunk")/boldigger3_data"
stem="$(basename "$chunk" .fasta)"
mkdir -p "$out"
printf 'xlsx' > "$out/${{stem}}_identification_result.xlsx"
cp "{}" "$out/${{stem}}_identification_result.parquet.snappy"
"#,
        parquet.display()
    );
    fs::write(&script, body).expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    script
}
