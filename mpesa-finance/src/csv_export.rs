//! Write classified M-Pesa transactions as CSV rows.
//!
//! Output layout (header always present):
//! Receipt No.,Completion Time,Details,Transaction Status,Paid In,Withdrawn,Balance

use anyhow::{Context, Result};
use mpesa_ingest::{TransactionRecord, parse_statement, read_statement};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub const HEADERS: [&str; 7] = [
    "Receipt No.",
    "Completion Time",
    "Details",
    "Transaction Status",
    "Paid In",
    "Withdrawn",
    "Balance",
];

/// One output row. `None` numerics serialize as empty fields.
#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    receipt: &'a str,
    completion_time: &'a str,
    details: &'a str,
    status: &'static str,
    paid_in: Option<String>,
    withdrawn: Option<String>,
    balance: Option<String>,
}

impl<'a> From<&'a TransactionRecord> for StatementRow<'a> {
    fn from(rec: &'a TransactionRecord) -> Self {
        Self {
            receipt: &rec.receipt_id,
            completion_time: &rec.completion_time,
            details: &rec.details,
            status: rec.status.as_str(),
            paid_in: rec.paid_in().map(|a| a.to_string()),
            withdrawn: rec.withdrawn().map(|a| a.to_string()),
            balance: rec.balance.map(|a| a.to_string()),
        }
    }
}

/// Write the header plus one row per record, in order. Returns the row count.
pub fn write_rows<W: Write>(writer: W, records: &[TransactionRecord]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADERS)?;
    for rec in records {
        wtr.serialize(StatementRow::from(rec))
            .with_context(|| format!("writing row for {}", rec.receipt_id))?;
    }
    wtr.flush()?;

    Ok(records.len())
}

/// Outcome of a [`convert`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub records: usize,
}

/// Read a statement dump, extract its transactions and write them as CSV.
pub fn convert(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConvertReport> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let text = read_statement(input)?;
    debug!(bytes = text.len(), input = %input.display(), "read statement");

    let records = parse_statement(&text)?;

    let file = std::fs::File::create(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let written = write_rows(file, &records)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(records = written, output = %output.display(), "wrote statement csv");
    Ok(ConvertReport { records: written })
}
