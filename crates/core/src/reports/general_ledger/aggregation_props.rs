//! Property-based tests for aggregation and row materialization.
//!
//! - Closing sums equal opening plus in-range sums, per group and globally
//! - Global opening equals the sum of pre-range lines
//! - Running balances restart at every undated row

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregation::{Aggregator, Period};
use super::filters::{GeneralLedgerFilters, RawFilters, validate_filters};
use super::rows::{apply_running_balance, materialize};
use crate::ledger::{AccountIndex, LedgerEntry};
use crate::ports::PassThrough;
use crate::reports::types::Accumulator;

/// Strategy to generate amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a grouping label, or none.
fn grouping() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("Categorize by Account")),
        Just(Some("Categorize by Party")),
        Just(Some("Categorize by Voucher")),
        Just(Some("Categorize by Voucher (Consolidated)")),
    ]
}

/// Strategy to generate a ledger line between 2023-12-01 and 2024-02-29.
fn ledger_line() -> impl Strategy<Value = LedgerEntry> {
    (
        0i64..91,
        0usize..3,
        0usize..4,
        prop::option::of(0usize..2),
        amount(),
        amount(),
        any::<bool>(),
    )
        .prop_map(|(offset, account, voucher, party, debit, credit, opening)| {
            let start = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
            let posting_date = start + Duration::days(offset);
            let mut entry = LedgerEntry::new(
                format!("GLE-{offset}-{account}-{voucher}"),
                "ACME",
                ["Cash", "Debtors", "Sales"][account],
                posting_date,
                "Journal Entry",
                format!("JV-{voucher}"),
                posting_date.and_hms_opt(9, 0, 0).unwrap(),
            )
            .with_amounts(debit, credit);
            if let Some(p) = party {
                entry = entry.with_party("Customer", format!("CUST-{p}"));
            }
            entry.is_opening = opening && offset % 7 == 0;
            entry
        })
}

/// Field-wise `a + b` for the sums the report keeps.
fn plus(a: &Accumulator, b: &Accumulator) -> Accumulator {
    let optional = |x: Option<Decimal>, y: Option<Decimal>| match (x, y) {
        (None, None) => None,
        (x, y) => Some(x.unwrap_or_default() + y.unwrap_or_default()),
    };
    Accumulator {
        debit: a.debit + b.debit,
        credit: a.credit + b.credit,
        debit_in_account_currency: a.debit_in_account_currency + b.debit_in_account_currency,
        credit_in_account_currency: a.credit_in_account_currency + b.credit_in_account_currency,
        debit_in_transaction_currency: optional(
            a.debit_in_transaction_currency,
            b.debit_in_transaction_currency,
        ),
        credit_in_transaction_currency: optional(
            a.credit_in_transaction_currency,
            b.credit_in_transaction_currency,
        ),
    }
}

fn filters(categorize_by: Option<&str>, show_opening_entries: bool) -> GeneralLedgerFilters {
    let mut value = serde_json::json!({
        "company": "ACME",
        "from_date": "2024-01-01",
        "to_date": "2024-01-31",
        "show_opening_entries": show_opening_entries,
    });
    if let Some(label) = categorize_by {
        value["categorize_by"] = label.into();
    }
    let raw = RawFilters::from_json(value).unwrap();
    validate_filters(&raw, &AccountIndex::default()).unwrap()
}

proptest! {
    /// Closing sums equal opening plus in-range sums for every group and globally.
    #[test]
    fn test_closing_is_opening_plus_total(
        entries in prop::collection::vec(ledger_line(), 0..40),
        categorize_by in grouping(),
        show_opening in any::<bool>(),
    ) {
        let filters = filters(categorize_by, show_opening);
        let aggregation = Aggregator::new(&filters, &PassThrough).aggregate(entries).unwrap();

        prop_assert_eq!(
            &aggregation.totals.closing,
            &plus(&aggregation.totals.opening, &aggregation.totals.total)
        );
        for group in &aggregation.groups {
            prop_assert_eq!(
                &group.totals.closing,
                &plus(&group.totals.opening, &group.totals.total)
            );
        }
    }

    /// Global opening is the sum of lines classified before the range.
    #[test]
    fn test_global_opening_sums_pre_range_lines(
        entries in prop::collection::vec(ledger_line(), 0..40),
        show_opening in any::<bool>(),
    ) {
        let filters = filters(None, show_opening);
        let aggregator = Aggregator::new(&filters, &PassThrough);

        let (mut debit, mut credit) = (Decimal::ZERO, Decimal::ZERO);
        let (mut total_debit, mut visible) = (Decimal::ZERO, 0usize);
        for entry in &entries {
            match aggregator.classify(entry) {
                Period::Opening => {
                    debit += entry.debit;
                    credit += entry.credit;
                }
                Period::InRange => {
                    total_debit += entry.debit;
                    visible += 1;
                }
                Period::Beyond => {}
            }
        }

        let aggregation = aggregator.aggregate(entries).unwrap();
        prop_assert_eq!(aggregation.totals.opening.debit, debit);
        prop_assert_eq!(aggregation.totals.opening.credit, credit);
        prop_assert_eq!(aggregation.totals.total.debit, total_debit);
        let grouped: usize = aggregation.groups.iter().map(|g| g.entries.len()).sum();
        prop_assert_eq!(grouped, visible);
    }

    /// Running balance equals the net of all rows since the last undated row.
    #[test]
    fn test_running_balance_restarts_at_undated_rows(
        entries in prop::collection::vec(ledger_line(), 0..40),
        categorize_by in grouping(),
    ) {
        let filters = filters(categorize_by, false);
        let aggregation = Aggregator::new(&filters, &PassThrough).aggregate(entries).unwrap();
        let mut rows = materialize(aggregation, &filters, &PassThrough);
        apply_running_balance(&mut rows, Some("USD"), Some("USD")).unwrap();

        let mut expected = Decimal::ZERO;
        for row in &rows {
            if row.posting_date().is_none() {
                expected = Decimal::ZERO;
            }
            expected += row.debit() - row.credit();
            prop_assert_eq!(row.balance, expected);
            prop_assert_eq!(row.presentation_currency.as_deref(), Some("USD"));
        }

        let again = rows.clone();
        apply_running_balance(&mut rows, Some("USD"), Some("USD")).unwrap();
        prop_assert_eq!(rows, again);
    }
}
