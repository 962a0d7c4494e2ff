//! mpesa-ingest: M-Pesa statement text extraction (segmenter + field classifier).

pub mod types;
pub mod parsers;

pub use types::{Amount, Flow, TransactionRecord, TransactionSpan, TransactionStatus};
pub use parsers::mpesa_text::{
    classify, normalize_newlines, parse_statement, read_statement, segment,
};
