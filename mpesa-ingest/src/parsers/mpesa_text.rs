//! M-Pesa statement text parser.
//!
//! Expected text after PDF-to-text export (bodies may wrap onto several lines):
//!   Receipt No. Completion Time Details Transaction Status Paid In Withdrawn Balance
//!   TLC8U0QFQ7 2024-01-05 10:00:00 Pay to John Doe Completed 1,000.00 4,500.00
//!   TLC8U0QFQ9 2024-01-06 11:30:00 Customer Transfer to
//!   0712345678 - JANE DOE Completed -250.00 4,250.00

use anyhow::{Context, Result};
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, trace};

use crate::types::{Amount, Flow, TransactionRecord, TransactionSpan, TransactionStatus};

/// Literal separating details from the trailing amount columns.
pub const STATUS_MARKER: &str = "Completed";

/// Receipt number + completion time, only at the start of a line.
const MARKER_PATTERN: &str =
    r"(?m)^(?P<receipt>[A-Z0-9]{10})\s+(?P<time>[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\s";

/// Collapse `\r\n` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Slice normalized statement text into per-transaction spans, in document order.
///
/// Text before the first marker (headers, column titles) is skipped. A body
/// runs to the start of the next marker's line, so it may span many lines.
pub fn segment(text: &str) -> Result<Vec<TransactionSpan<'_>>> {
    let marker_re = Regex::new(MARKER_PATTERN)?;

    let mut spans = Vec::new();
    let mut pending: Option<(&str, &str, usize)> = None;

    for caps in marker_re.captures_iter(text) {
        let whole = caps.get(0).context("marker match without group 0")?;
        if let Some((receipt_id, timestamp, body_start)) = pending.take() {
            spans.push(TransactionSpan {
                receipt_id,
                timestamp,
                body: &text[body_start..whole.start()],
            });
        }
        let receipt = caps.name("receipt").context("marker without receipt")?;
        let time = caps.name("time").context("marker without time")?;
        pending = Some((receipt.as_str(), time.as_str(), whole.end()));
    }

    if let Some((receipt_id, timestamp, body_start)) = pending {
        spans.push(TransactionSpan {
            receipt_id,
            timestamp,
            body: &text[body_start..],
        });
    }

    debug!(spans = spans.len(), "segmented statement text");
    Ok(spans)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a span body into details, status and the trailing numeric fields.
///
/// Never fails: a missing status marker gives `Unknown`, and tokens that are
/// not numbers are dropped.
pub fn classify(span: &TransactionSpan<'_>) -> TransactionRecord {
    let joined = span.body.replace('\n', " ");
    let line = joined.trim();

    let (details, status, flow, balance) = match line.split_once(STATUS_MARKER) {
        Some((details, rest)) => {
            // Only the text up to a repeated marker holds amounts.
            let segment = match rest.find(STATUS_MARKER) {
                Some(i) => &rest[..i],
                None => rest,
            };
            let (flow, balance) = classify_amounts(segment.trim());
            (details, TransactionStatus::Completed, flow, balance)
        }
        None => (line, TransactionStatus::Unknown, None, None),
    };

    TransactionRecord {
        receipt_id: span.receipt_id.to_string(),
        completion_time: span.timestamp.to_string(),
        details: collapse_whitespace(details),
        status,
        flow,
        balance,
    }
}

/// Last number is the balance, the one before it the signed amount.
fn classify_amounts(segment: &str) -> (Option<Flow>, Option<Amount>) {
    let amounts: Vec<Amount> = segment
        .split_whitespace()
        .filter_map(|token| {
            let parsed = Amount::parse(token);
            if parsed.is_none() {
                trace!(token, "skipping non-numeric token");
            }
            parsed
        })
        .collect();

    match amounts.as_slice() {
        [] => (None, None),
        [balance] => (None, Some(*balance)),
        [.., amount, balance] => {
            let flow = if amount.is_negative() {
                Flow::Withdrawn(amount.abs())
            } else {
                Flow::PaidIn(amount.abs())
            };
            (Some(flow), Some(*balance))
        }
    }
}

/// Full text pipeline: normalize, segment, classify.
pub fn parse_statement(text: &str) -> Result<Vec<TransactionRecord>> {
    let normalized = normalize_newlines(text);
    let records: Vec<TransactionRecord> = segment(&normalized)?.iter().map(classify).collect();
    debug!(records = records.len(), "classified transactions");
    Ok(records)
}

/// Read a UTF-8 statement dump from disk.
pub fn read_statement(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
