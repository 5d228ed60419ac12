//! Historical dataset loading: reads the campaign export (CSV or spreadsheet),
//! discovers the metric columns and turns rows into [`HistoricalRecord`]s.
//!
//! [`HistoricalRecord`]: campaign_core::types::HistoricalRecord

pub mod columns;
pub mod csv_source;
pub mod loader;
pub mod table;
pub mod workbook;

pub use columns::ColumnMap;
pub use loader::{build_snapshot, load_records};
pub use table::{Cell, Table};
