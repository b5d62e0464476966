#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::models::{TransactionStatus, TransactionType};

fn txn(id: &str, kind: TransactionType, status: &str, amount: rust_decimal::Decimal, due: Option<&str>) -> Transaction {
    Transaction {
        id: id.into(),
        title: Some(format!("title {id}")),
        description: format!("a rather long description for {id}"),
        amount,
        kind,
        status: TransactionStatus::parse(status),
        due_date: due.map(str::to_string),
        created_at: "2024-01-01".into(),
    }
}

#[test]
fn test_build_selects_by_due_date_month() {
    let txns = vec![
        txn("in", TransactionType::Income, "completed", dec!(100), Some("2024-03-28")),
        txn("edge", TransactionType::Expense, "pending", dec!(40), Some("2024-03-01")),
        txn("other-month", TransactionType::Expense, "completed", dec!(999), Some("2024-02-28")),
        txn("other-year", TransactionType::Expense, "completed", dec!(999), Some("2023-03-15")),
        txn("no-due", TransactionType::Expense, "completed", dec!(999), None),
    ];
    let report = MonthlyReport::build(&txns, 2024, 3);
    let ids: Vec<&str> = report.rows.iter().map(|t| t.id.as_str()).collect();
    // Sorted newest due date first.
    assert_eq!(ids, ["in", "edge"]);
}

#[test]
fn test_totals_ignore_status() {
    let txns = vec![
        txn("1", TransactionType::Income, "completed", dec!(100), Some("2024-03-10")),
        txn("2", TransactionType::Income, "pending", dec!(50), Some("2024-03-11")),
        txn("3", TransactionType::Expense, "cancelled", dec!(30), Some("2024-03-12")),
    ];
    let report = MonthlyReport::build(&txns, 2024, 3);
    assert_eq!(report.total_income, dec!(150));
    assert_eq!(report.total_expense, dec!(30));
    assert_eq!(report.net_balance, dec!(120));
}

#[test]
fn test_empty_month_builds_an_empty_report() {
    let report = MonthlyReport::build(&[], 2024, 3);
    assert!(report.is_empty());
    assert_eq!(report.total_income, rust_decimal::Decimal::ZERO);
    assert_eq!(report.net_balance, rust_decimal::Decimal::ZERO);
}

#[test]
fn test_default_filename_zero_pads_the_month() {
    let report = MonthlyReport::build(&[], 2025, 7);
    assert_eq!(report.default_filename(), "nextmove-report-07-2025.pdf");
    let report = MonthlyReport::build(&[], 2025, 11);
    assert_eq!(report.default_filename(), "nextmove-report-11-2025.pdf");
}

#[test]
fn test_period_label() {
    assert_eq!(MonthlyReport::build(&[], 2024, 3).period_label(), "March 2024");
    assert_eq!(MonthlyReport::build(&[], 2023, 12).period_label(), "December 2023");
}

#[test]
fn test_pagination_never_ends_on_a_blank_page() {
    let full_page: Vec<Transaction> = (0..28)
        .map(|i| txn(&format!("{i}"), TransactionType::Expense, "pending", dec!(1), Some("2024-03-10")))
        .collect();
    let report = MonthlyReport::build(&full_page, 2024, 3);
    assert_eq!(report.paginate().len(), 1);

    let mut overflow = full_page.clone();
    overflow.push(txn("29", TransactionType::Expense, "pending", dec!(1), Some("2024-03-10")));
    let report = MonthlyReport::build(&overflow, 2024, 3);
    let chunks = report.paginate();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].len(), 1);
}

#[test]
fn test_write_pdf_produces_a_pdf_file() {
    let txns = vec![
        txn("1", TransactionType::Income, "completed", dec!(1200.50), Some("2024-03-10")),
        txn("2", TransactionType::Expense, "pending", dec!(75), Some("2024-03-05")),
    ];
    let report = MonthlyReport::build(&txns, 2024, 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(report.default_filename());
    report.write_pdf(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[test]
fn test_write_pdf_handles_an_empty_month() {
    let report = MonthlyReport::build(&[], 2024, 6);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    report.write_pdf(&path).unwrap();
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}
