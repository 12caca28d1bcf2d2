/// Columnar table I/O for classification results
///
/// Per-chunk and merged results are Parquet files (Snappy compressed). Tables
/// are handled as a single Arrow `RecordBatch`; part files are small enough
/// that this keeps the merge simple.
use crate::BoldChunkError;
use arrow::array::{RecordBatch, UInt32Array};
use arrow::compute::{cast, concat_batches, take_record_batch};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::row::{RowConverter, SortField};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{WriterProperties, WriterVersion};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Read a whole Parquet file into one batch.
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<RecordBatch, BoldChunkError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| BoldChunkError::Table(format!("{}: {}", path.display(), e)))?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Number of rows recorded in a Parquet footer, without decoding data pages.
pub fn parquet_row_count<P: AsRef<Path>>(path: P) -> Result<usize, BoldChunkError> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.metadata().file_metadata().num_rows().max(0) as usize)
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_writer_version(WriterVersion::PARQUET_2_0)
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write one batch as a Snappy-compressed Parquet file.
pub fn write_parquet<P: AsRef<Path>>(path: P, batch: &RecordBatch) -> Result<(), BoldChunkError> {
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties()))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Concatenate tables with the same column names, in the given order.
///
/// A column that is entirely null in some part may arrive as `Null`; it is
/// cast to the type the other parts carry.
pub fn concat_tables(tables: &[RecordBatch]) -> Result<RecordBatch, BoldChunkError> {
    if tables.is_empty() {
        return Err(BoldChunkError::Table("No tables to concatenate".to_string()));
    }
    let schema = unified_schema(tables)?;

    let mut aligned = Vec::with_capacity(tables.len());
    for table in tables {
        let columns = table
            .columns()
            .iter()
            .zip(schema.fields())
            .map(|(column, field)| {
                if column.data_type() == field.data_type() {
                    Ok(column.clone())
                } else {
                    cast(column, field.data_type())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        aligned.push(RecordBatch::try_new(schema.clone(), columns)?);
    }

    Ok(concat_batches(&schema, &aligned)?)
}

fn unified_schema(tables: &[RecordBatch]) -> Result<SchemaRef, BoldChunkError> {
    let mut fields: Vec<Field> = tables[0]
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();

    for (position, table) in tables.iter().enumerate().skip(1) {
        let schema = table.schema();
        let mismatch = || {
            BoldChunkError::Table(format!(
                "Schema of table {} does not match the first table: [{}] vs [{}]",
                position + 1,
                describe_fields(schema.fields().iter().map(|f| f.as_ref())),
                describe_fields(fields.iter()),
            ))
        };

        let same_names = schema.fields().len() == fields.len()
            && schema
                .fields()
                .iter()
                .zip(&fields)
                .all(|(a, b)| a.name() == b.name());
        if !same_names {
            return Err(mismatch());
        }

        let mut unified = fields.clone();
        for (field, other) in unified.iter_mut().zip(schema.fields().iter()) {
            *field = match (field.data_type(), other.data_type()) {
                (a, b) if a == b => field.clone().with_nullable(field.is_nullable() || other.is_nullable()),
                (DataType::Null, b) => Field::new(field.name(), b.clone(), true),
                (_, DataType::Null) => field.clone().with_nullable(true),
                _ => return Err(mismatch()),
            };
        }
        fields = unified;
    }

    Ok(Arc::new(Schema::new(fields)))
}

/// Drop rows that equal an earlier row in every column. The first
/// occurrence wins and the relative order of survivors is kept.
pub fn drop_duplicate_rows(batch: &RecordBatch) -> Result<RecordBatch, BoldChunkError> {
    if batch.num_columns() == 0 || batch.num_rows() < 2 {
        return Ok(batch.clone());
    }

    let fields = batch
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    let keep: Vec<u32> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| seen.insert(row.owned()))
        .map(|(index, _)| index as u32)
        .collect();

    if keep.len() == batch.num_rows() {
        return Ok(batch.clone());
    }

    Ok(take_record_batch(batch, &UInt32Array::from(keep))?)
}

fn describe_fields<'a>(fields: impl Iterator<Item = &'a Field>) -> String {
    fields
        .map(|f| format!("{}: {:?}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}
