/// Parquet to CSV conversion in bounded-size batches
use crate::BoldChunkError;
use arrow::csv::WriterBuilder;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_EXPORT_BATCH_SIZE: usize = 5_000;

/// Stream `parquet_path` into `csv_path` with a single header row.
/// Returns the number of data rows written.
pub fn parquet_to_csv(
    parquet_path: &Path,
    csv_path: &Path,
    batch_size: usize,
) -> Result<usize, BoldChunkError> {
    if batch_size == 0 {
        return Err(BoldChunkError::Config(
            "batch size must be greater than zero".to_string(),
        ));
    }

    let file = File::open(parquet_path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;

    let out = BufWriter::new(File::create(csv_path)?);
    let mut writer = WriterBuilder::new().with_header(true).build(out);

    let mut rows = 0;
    for batch in reader {
        let batch = batch?;
        rows += batch.num_rows();
        writer.write(&batch)?;
        debug!("Exported {} rows", rows);
    }

    writer.into_inner().flush()?;
    Ok(rows)
}
