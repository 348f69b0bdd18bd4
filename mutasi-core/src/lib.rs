//! mutasi-core: shared types and pure utilities for Indonesian bank statement parsing

pub mod calendar;
pub mod csv_export;
pub mod number;
pub mod serde_fmt;
pub mod transaction;

pub use calendar::{
    parse_date_prefix, parse_indonesian_date, parse_time_prefix, DatePrefix, TimePrefix,
};
pub use csv_export::{
    read_transactions_csv, read_transactions_csv_path, transactions_to_csv,
    write_transactions_csv, CSV_COLUMNS,
};
pub use number::{normalize_number_separators, parse_idr_number};
pub use transaction::{Transaction, CURRENCY};
