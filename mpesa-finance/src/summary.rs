//! Statement-level aggregates over classified transactions: totals, closing
//! balance, date range, and fee consolidation.

use chrono::NaiveDateTime;
use mpesa_ingest::{TransactionRecord, TransactionStatus};
use serde::Serialize;

/// Details fragments (lowercased) that mark a row as a fee on the previous transaction.
pub const FEE_KEYWORDS: [&str; 4] = [
    "transaction charge",
    "withdrawal fee",
    "excise duty",
    "ledger fee",
];

pub fn is_fee(rec: &TransactionRecord) -> bool {
    let details = rec.details.to_lowercase();
    FEE_KEYWORDS.iter().any(|kw| details.contains(kw))
}

/// A transaction with the fee rows that followed it folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedTransaction {
    pub record: TransactionRecord,
    pub fees: f64,
    pub fee_count: usize,
    /// Principal (withdrawn, else paid in) plus fees.
    pub total_cost: f64,
}

/// Fold fee rows into the transaction immediately before them.
/// A fee with nothing before it is kept as its own entry.
pub fn consolidate_fees(records: &[TransactionRecord]) -> Vec<ConsolidatedTransaction> {
    let mut out: Vec<ConsolidatedTransaction> = Vec::new();

    for rec in records {
        let fee = rec.withdrawn().map(|a| a.value()).unwrap_or(0.0);
        if is_fee(rec) {
            if let Some(parent) = out.last_mut() {
                parent.fees += fee;
                parent.fee_count += 1;
                parent.total_cost += fee;
                continue;
            }
        }

        let principal = rec
            .withdrawn()
            .or_else(|| rec.paid_in())
            .map(|a| a.value())
            .unwrap_or(0.0);
        out.push(ConsolidatedTransaction {
            record: rec.clone(),
            fees: 0.0,
            fee_count: 0,
            total_cost: principal,
        });
    }

    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSummary {
    pub records: usize,
    pub completed: usize,
    pub unknown: usize,
    pub total_paid_in: f64,
    pub total_withdrawn: f64,
    /// `total_paid_in - total_withdrawn`
    pub net_flow: f64,
    pub total_fees: f64,
    pub consolidated_transactions: usize,
    pub closing_balance: Option<f64>,
    pub first_completed: Option<NaiveDateTime>,
    pub last_completed: Option<NaiveDateTime>,
}

pub fn summarize(records: &[TransactionRecord]) -> StatementSummary {
    let completed = records
        .iter()
        .filter(|r| r.status == TransactionStatus::Completed)
        .count();
    let total_paid_in: f64 = records.iter().filter_map(|r| r.paid_in()).map(|a| a.value()).sum();
    let total_withdrawn: f64 = records.iter().filter_map(|r| r.withdrawn()).map(|a| a.value()).sum();

    let consolidated = consolidate_fees(records);
    let total_fees: f64 = records
        .iter()
        .filter(|r| is_fee(r))
        .filter_map(|r| r.withdrawn())
        .map(|a| a.value())
        .sum();

    let closing_balance = records.iter().rev().find_map(|r| r.balance).map(|a| a.value());

    let times: Vec<NaiveDateTime> = records.iter().filter_map(|r| r.completed_at()).collect();

    StatementSummary {
        records: records.len(),
        completed,
        unknown: records.len() - completed,
        total_paid_in,
        total_withdrawn,
        net_flow: total_paid_in - total_withdrawn,
        total_fees,
        consolidated_transactions: consolidated.len(),
        closing_balance,
        first_completed: times.iter().min().copied(),
        last_completed: times.iter().max().copied(),
    }
}
