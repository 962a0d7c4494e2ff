//! mpesa-finance: CSV export of extracted statements, plus statement summaries.

pub mod csv_export;
pub mod summary;

pub use csv_export::{ConvertReport, HEADERS, convert, write_rows};
pub use summary::{ConsolidatedTransaction, StatementSummary, consolidate_fees, summarize};
