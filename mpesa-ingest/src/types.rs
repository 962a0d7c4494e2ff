use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

/// Format of the completion timestamp in the statement marker.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Optional sign, digits, optional fraction. Rejects the `inf`/`nan`/exponent
// spellings that `f64::from_str` would otherwise accept.
fn is_plain_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    !(int.is_empty() && frac.is_empty()) && digits(int) && digits(frac)
}

/// A numeric token from the statement, keeping the precision it was written with.
///
/// `1,000.00` displays as `1000.00`, `4250` as `4250`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amount {
    value: f64,
    scale: usize,
}

impl Amount {
    pub fn new(value: f64, scale: usize) -> Self {
        Self { value, scale }
    }

    /// Parse a statement token: thousands separators are dropped, an optional
    /// sign and fractional part are allowed. Anything else yields `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let cleaned = token.replace(',', "");
        if !is_plain_decimal(&cleaned) {
            return None;
        }
        let value: f64 = cleaned.parse().ok()?;
        let scale = cleaned
            .split_once('.')
            .map(|(_, frac)| frac.len())
            .unwrap_or(0);
        Some(Self { value, scale })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of fractional digits used when displaying.
    pub fn scale(&self) -> usize {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.value < 0.0
    }

    pub fn abs(self) -> Self {
        Self {
            value: self.value.abs(),
            scale: self.scale,
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", self.scale, self.value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A region of statement text believed to hold one transaction.
/// Borrows from the normalized statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSpan<'a> {
    /// Exactly 10 characters of `[A-Z0-9]`.
    pub receipt_id: &'a str,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: &'a str,
    /// Everything after the marker up to the next marker (or end of text).
    pub body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionStatus {
    Completed,
    Unknown,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the transaction amount. Both variants hold a non-negative amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Flow {
    PaidIn(Amount),
    Withdrawn(Amount),
}

/// Classified result of one transaction span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub receipt_id: String,
    pub completion_time: String,
    pub details: String,
    pub status: TransactionStatus,
    pub flow: Option<Flow>,
    pub balance: Option<Amount>,
}

impl TransactionRecord {
    pub fn paid_in(&self) -> Option<Amount> {
        match self.flow {
            Some(Flow::PaidIn(a)) => Some(a),
            _ => None,
        }
    }

    pub fn withdrawn(&self) -> Option<Amount> {
        match self.flow {
            Some(Flow::Withdrawn(a)) => Some(a),
            _ => None,
        }
    }

    /// Completion time as a calendar value, if the marker timestamp is a real date.
    pub fn completed_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.completion_time, TIMESTAMP_FORMAT).ok()
    }
}
