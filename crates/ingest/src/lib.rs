//! Load stage: turns delimited audit-log text into a typed [`RawTable`].
//!
//! [`RawTable`]: auditlens_core::RawTable

pub mod column_type;
pub mod csv_import;

pub use column_type::ColumnKind;
pub use csv_import::CsvImporter;
