//! Flattens an aggregation into display rows and stamps running balances.

use rust_decimal::Decimal;

use super::aggregation::Aggregation;
use super::filters::{CategorizeBy, GeneralLedgerFilters};
use crate::ports::Translate;
use crate::reports::error::ReportError;
use crate::reports::types::{
    OutputRow, RowKind, Subtotal, Totals, TotalsKind, checked_diff, checked_sum,
};

/// Which subtotal rows frame each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framing {
    /// Emit the group's Opening and Closing rows.
    pub opening_closing: bool,
    /// Emit the group's Total row.
    pub total: bool,
}

impl Framing {
    /// Framing for a grouping mode and voucher filter.
    ///
    /// Voucher groups carry no opening/closing, and neither does an
    /// ungrouped single-voucher report, which also drops the group total.
    #[must_use]
    pub fn for_filters(categorize_by: Option<CategorizeBy>, has_voucher_no: bool) -> Self {
        let opening_closing = match categorize_by {
            None => !has_voucher_no,
            Some(mode) => mode != CategorizeBy::Voucher,
        };
        Self {
            opening_closing,
            total: categorize_by.is_some() || !has_voucher_no,
        }
    }
}

/// Produces the ordered rows for an aggregation.
pub fn materialize(
    aggregation: Aggregation,
    filters: &GeneralLedgerFilters,
    translator: &dyn Translate,
) -> Vec<OutputRow> {
    let subtotal = |totals: &Totals, kind: TotalsKind| {
        OutputRow::new(RowKind::Subtotal(Subtotal {
            kind,
            label: translator.translate(kind.label()),
            amounts: totals.get(kind).clone(),
        }))
    };
    let separator = || OutputRow::new(RowKind::Separator);

    let mut rows = vec![subtotal(&aggregation.totals, TotalsKind::Opening)];

    if filters.categorize_by == Some(CategorizeBy::VoucherConsolidated) {
        rows.extend(
            aggregation
                .consolidated
                .into_iter()
                .map(|entry| OutputRow::new(RowKind::Entry(Box::new(entry)))),
        );
    } else {
        let framing = Framing::for_filters(filters.categorize_by, filters.voucher_no.is_some());
        for group in aggregation.groups {
            if group.entries.is_empty() {
                continue;
            }
            rows.push(separator());
            if framing.opening_closing {
                rows.push(subtotal(&group.totals, TotalsKind::Opening));
            }
            rows.extend(
                group
                    .entries
                    .into_iter()
                    .map(|entry| OutputRow::new(RowKind::Entry(Box::new(entry)))),
            );
            if framing.total {
                rows.push(subtotal(&group.totals, TotalsKind::Total));
            }
            if framing.opening_closing {
                rows.push(subtotal(&group.totals, TotalsKind::Closing));
            }
        }
        rows.push(separator());
    }

    rows.push(subtotal(&aggregation.totals, TotalsKind::Total));
    rows.push(subtotal(&aggregation.totals, TotalsKind::Closing));
    rows
}

/// Stamps running balances and currencies.
///
/// The balance restarts at every undated row, then each row, undated ones
/// included, adds its own `debit - credit`. The resolved account currency
/// replaces the one carried by each line.
pub fn apply_running_balance(
    rows: &mut [OutputRow],
    account_currency: Option<&str>,
    presentation_currency: Option<&str>,
) -> Result<(), ReportError> {
    let mut balance = Decimal::ZERO;
    for row in rows {
        if row.posting_date().is_none() {
            balance = Decimal::ZERO;
        }
        let movement = checked_diff(row.debit(), row.credit(), "running balance")?;
        balance = checked_sum(balance, movement, "running balance")?;
        row.balance = balance;
        if let RowKind::Entry(entry) = &mut row.row {
            entry.account_currency = None;
        }
        row.account_currency = account_currency.map(str::to_string);
        row.presentation_currency = presentation_currency.map(str::to_string);
    }
    Ok(())
}
