use mpesa_finance::{convert, summarize};
use mpesa_ingest::{parse_statement, read_statement};
use std::fs;

const RAW_SUBSET: &str = "MPESA FULL STATEMENT\r\n\
Receipt No. Completion Time Details Transaction Status Paid In Withdrawn Balance\r\n\
TLC8U0QFQ7 2024-01-05 10:00:00 Pay to John Doe Completed 1,000.00 4,500.00\r\n\
TLC8U0QFQ9 2024-01-05 12:00:00 Customer Transfer to\r\n\
0712345678 - JANE DOE Completed -250.00 4,250.00\r\n\
TLC8U0QFQ8 2024-01-06 09:00:00 Pending Transfer\r\n";

const EXPECTED_CSV: &str = "\
Receipt No.,Completion Time,Details,Transaction Status,Paid In,Withdrawn,Balance
TLC8U0QFQ7,2024-01-05 10:00:00,Pay to John Doe,Completed,1000.00,,4500.00
TLC8U0QFQ9,2024-01-05 12:00:00,Customer Transfer to 0712345678 - JANE DOE,Completed,,250.00,4250.00
TLC8U0QFQ8,2024-01-06 09:00:00,Pending Transfer,Unknown,,,
";

/// End-to-end: raw export on disk to CSV on disk.
#[test]
fn test_convert_writes_expected_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw_subset.txt");
    let output = dir.path().join("sample_data.csv");
    fs::write(&input, RAW_SUBSET).unwrap();

    let report = convert(&input, &output).unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(fs::read_to_string(&output).unwrap(), EXPECTED_CSV);
}

#[test]
fn test_convert_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.txt");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    fs::write(&input, RAW_SUBSET).unwrap();

    convert(&input, &first).unwrap();
    convert(&input, &second).unwrap();
    // Overwriting an existing output gives the same bytes too.
    convert(&input, &first).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_convert_without_markers_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    let output = dir.path().join("out.csv");
    fs::write(&input, "Statement period: January 2024\nNo activity.\n").unwrap();

    let report = convert(&input, &output).unwrap();
    assert_eq!(report.records, 0);
    let out = fs::read_to_string(&output).unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with("Receipt No.,Completion Time"));
}

#[test]
fn test_convert_missing_input_fails_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.txt");
    let output = dir.path().join("out.csv");

    let err = convert(&input, &output).unwrap_err();
    assert!(format!("{err:#}").contains("missing.txt"));
    assert!(!output.exists(), "no output when the input is unreadable");
}

#[test]
fn test_convert_unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.txt");
    fs::write(&input, RAW_SUBSET).unwrap();
    let output = dir.path().join("no_such_dir").join("out.csv");

    let err = convert(&input, &output).unwrap_err();
    assert!(format!("{err:#}").contains("out.csv"));
}

/// Exactly one of paid in / withdrawn per record once two numbers follow the status.
#[test]
fn test_flow_is_exclusive_across_statement() {
    let records = parse_statement(RAW_SUBSET).unwrap();
    for rec in records.iter().filter(|r| r.balance.is_some()) {
        assert!(rec.paid_in().is_some() ^ rec.withdrawn().is_some(), "{}", rec.receipt_id);
    }
    let s = summarize(&records);
    assert_eq!(s.closing_balance, Some(4250.0));
}

#[test]
fn test_read_statement_round_trips_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.txt");
    fs::write(&input, RAW_SUBSET).unwrap();
    assert_eq!(read_statement(&input).unwrap(), RAW_SUBSET);
}
