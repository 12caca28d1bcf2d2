pub mod export;
pub mod table;

pub use export::parquet_to_csv;
pub use table::{concat_tables, drop_duplicate_rows, read_parquet, write_parquet};
