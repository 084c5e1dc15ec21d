//! Reporting composition tests
//!
//! Reports are folds over ledger aggregates; empty inputs must come back
//! as zeroed totals, never as missing values.

use rust_decimal::Decimal;
use std::str::FromStr;

use mill_records_backend::services::ledger::{BalanceEntry, LedgerSummary};
use mill_records_backend::services::reporting::{fold_position, ReportingService};
use shared::types::DateRange;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn entry(variety: Option<&str>, credit: &str, debit: &str, bags: i64) -> BalanceEntry {
    BalanceEntry {
        commodity: "Paddy".to_string(),
        variety: variety.map(|v| v.to_string()),
        total_credit: dec(credit),
        total_debit: dec(debit),
        balance: dec(credit) - dec(debit),
        total_bags: bags,
    }
}

#[test]
fn empty_commodity_position_is_zeroed() {
    let position = fold_position("FRK", Vec::new());

    assert_eq!(position.commodity, "FRK");
    assert_eq!(position.total_credit, Decimal::ZERO);
    assert_eq!(position.total_debit, Decimal::ZERO);
    assert_eq!(position.balance, Decimal::ZERO);
    assert_eq!(position.total_bags, 0);
    assert!(position.varieties.is_empty());
}

#[test]
fn commodity_position_sums_its_varieties() {
    let entries = vec![
        entry(Some("Mota"), "120", "45", 30),
        entry(Some("Sarna"), "60", "10", 12),
    ];

    let position = fold_position("Paddy", entries);

    assert_eq!(position.total_credit, dec("180"));
    assert_eq!(position.total_debit, dec("55"));
    assert_eq!(position.balance, dec("125"));
    assert_eq!(position.total_bags, 42);
    assert_eq!(position.varieties.len(), 2);
}

#[test]
fn default_summary_is_all_zero() {
    let summary = LedgerSummary::default();

    assert_eq!(summary.transaction_count, 0);
    assert_eq!(summary.total_credit, Decimal::ZERO);
    assert_eq!(summary.total_debit, Decimal::ZERO);
    assert_eq!(summary.net_movement, Decimal::ZERO);
    assert_eq!(summary.total_bags, 0);
}

#[test]
fn open_date_ranges_widen_to_the_full_window() {
    let range = DateRange::default();
    let (start, end) = range.bounds();

    assert!(start < end);
    assert_eq!(start.to_string(), "2000-01-01");
    assert_eq!(end.to_string(), "2100-12-31");
}

#[test]
fn balances_export_as_csv() {
    let entries = vec![
        entry(Some("Mota"), "120", "45", 30),
        entry(None, "10", "0", 2),
    ];

    let csv = ReportingService::export_to_csv(&entries).unwrap();
    let mut lines = csv.lines();

    let header = lines.next().unwrap();
    assert!(header.contains("commodity"));
    assert!(header.contains("balance"));
    assert_eq!(lines.count(), 2);
}
