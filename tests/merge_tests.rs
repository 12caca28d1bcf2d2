mod common;

use boldchunk::processing::merger::ResultMerger;
use boldchunk::storage::export::parquet_to_csv;
use boldchunk::storage::table::{parquet_row_count, write_parquet};
use arrow::array::{Array, ArrayRef, NullArray, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use boldchunk::storage::table::read_parquet;
use boldchunk::{BoldChunkError, RunLayout};
use common::*;
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

fn ids(prefix: &str, range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("{}{:02}", prefix, i)).collect()
}

fn write_part(layout: &RunLayout, index: usize, ids: &[String]) {
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    write_parquet(layout.columnar_part_path(index), &id_table(&refs)).unwrap();
}

#[test]
fn test_cross_part_duplicates_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();

    let first = ids("a", 0..10);
    // two rows repeated from part 1
    let mut second = ids("b", 0..8);
    second.extend(first[..2].iter().cloned());
    // one row repeated from part 2
    let mut third = ids("c", 0..4);
    third.push(second[0].clone());

    write_part(&layout, 1, &first);
    write_part(&layout, 2, &second);
    write_part(&layout, 3, &third);

    let summary = ResultMerger::new(&layout).merge().unwrap();
    assert_eq!(summary.input_rows, 25);
    assert_eq!(summary.output_rows, 22);
    assert_eq!(summary.duplicates_removed(), 3);
    assert_eq!(parquet_row_count(layout.merged_path()).unwrap(), 22);

    let merged = read_ids(&layout.merged_path());
    assert_eq!(&merged[..10], &first[..]);
    assert_eq!(&merged[10..18], &second[..8]);
    assert_eq!(&merged[18..], &third[..4]);
}

#[test]
fn test_distinct_parts_keep_every_row() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();

    write_part(&layout, 1, &ids("a", 0..10));
    write_part(&layout, 2, &ids("b", 0..10));
    write_part(&layout, 3, &ids("c", 0..5));

    let summary = ResultMerger::new(&layout).merge().unwrap();
    assert_eq!(summary.output_rows, 25);
    assert_eq!(summary.duplicates_removed(), 0);
}

#[test]
fn test_parts_of_other_runs_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    let other = RunLayout::new(Path::new("other.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();

    write_part(&layout, 1, &ids("a", 0..3));
    write_part(&other, 1, &ids("z", 0..7));

    assert_eq!(ResultMerger::new(&layout).merge().unwrap().output_rows, 3);
}

#[test]
fn test_part_with_all_null_column_is_merged() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();
    write_part(&layout, 1, &ids("a", 0..3));

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("species", DataType::Null, true),
    ]));
    let unresolved = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["b00", "b01"])) as ArrayRef,
            Arc::new(NullArray::new(2)) as ArrayRef,
        ],
    )
    .unwrap();
    write_parquet(layout.columnar_part_path(2), &unresolved).unwrap();

    let summary = ResultMerger::new(&layout).merge().unwrap();
    assert_eq!(summary.output_rows, 5);

    let merged = read_parquet(layout.merged_path()).unwrap();
    assert_eq!(merged.schema().field(1).data_type(), &DataType::Utf8);
    assert_eq!(merged.column(1).null_count(), 2);
}

#[test]
fn test_tabular_parts_are_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();
    write_part(&layout, 1, &ids("a", 0..4));
    std::fs::write(layout.tabular_part_path(1), b"spreadsheet").unwrap();

    let summary = ResultMerger::new(&layout).merge().unwrap();
    assert_eq!(summary.parts, 1);
    assert_eq!(std::fs::read(layout.tabular_part_path(1)).unwrap(), b"spreadsheet");
    assert_eq!(layout.existing_tabular_parts().unwrap().len(), 1);
}

#[test]
fn test_merge_without_parts_fails() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    assert!(matches!(
        ResultMerger::new(&layout).merge().unwrap_err(),
        BoldChunkError::NoPartsFound { .. }
    ));
}

#[test]
fn test_merged_table_exports_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let layout = RunLayout::new(Path::new("asv.fasta"), Some(dir.path())).unwrap();
    layout.ensure_dirs().unwrap();
    write_part(&layout, 1, &ids("a", 0..10));
    write_part(&layout, 2, &ids("b", 0..10));
    ResultMerger::new(&layout).merge().unwrap();

    let csv = dir.path().join("merged.csv");
    let rows = parquet_to_csv(&layout.merged_path(), &csv, 7).unwrap();
    assert_eq!(rows, 20);

    let text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 21);
    assert_eq!(text.lines().next(), Some("id,species"));
}
