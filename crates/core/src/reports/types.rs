//! Report output types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::ledger::LedgerEntry;

/// Running debit/credit sums.
///
/// Transaction-currency sums stay unset until a value is added to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accumulator {
    /// Debit in presentation currency.
    pub debit: Decimal,
    /// Credit in presentation currency.
    pub credit: Decimal,
    /// Debit in account currency.
    pub debit_in_account_currency: Decimal,
    /// Credit in account currency.
    pub credit_in_account_currency: Decimal,
    /// Debit in transaction currency.
    pub debit_in_transaction_currency: Option<Decimal>,
    /// Credit in transaction currency.
    pub credit_in_transaction_currency: Option<Decimal>,
}

impl Accumulator {
    /// Adds the line's company- and account-currency amounts.
    pub fn add(&mut self, entry: &LedgerEntry) -> Result<(), ReportError> {
        self.debit = checked_sum(self.debit, entry.debit, "totals")?;
        self.credit = checked_sum(self.credit, entry.credit, "totals")?;
        self.debit_in_account_currency = checked_sum(
            self.debit_in_account_currency,
            entry.debit_in_account_currency,
            "totals",
        )?;
        self.credit_in_account_currency = checked_sum(
            self.credit_in_account_currency,
            entry.credit_in_account_currency,
            "totals",
        )?;
        Ok(())
    }
}

/// `a + b`, or [`ReportError::AmountOverflow`] naming what was being computed.
pub(crate) fn checked_sum(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, ReportError> {
    a.checked_add(b).ok_or(ReportError::AmountOverflow(what))
}

/// `a - b`, or [`ReportError::AmountOverflow`] naming what was being computed.
pub(crate) fn checked_diff(
    a: Decimal,
    b: Decimal,
    what: &'static str,
) -> Result<Decimal, ReportError> {
    a.checked_sub(b).ok_or(ReportError::AmountOverflow(what))
}

/// Which of the three accumulators a subtotal row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsKind {
    /// Balance brought forward from before the range.
    Opening,
    /// Movement within the range.
    Total,
    /// Opening plus movement.
    Closing,
}

impl TotalsKind {
    /// Untranslated row label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Total => "Total",
            Self::Closing => "Closing (Opening + Total)",
        }
    }
}

/// Opening, in-range and closing sums of one group (or the whole report).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Before the range.
    pub opening: Accumulator,
    /// Within the range.
    pub total: Accumulator,
    /// `opening + total`.
    pub closing: Accumulator,
}

impl Totals {
    /// Accumulator selected by kind.
    #[must_use]
    pub const fn get(&self, kind: TotalsKind) -> &Accumulator {
        match kind {
            TotalsKind::Opening => &self.opening,
            TotalsKind::Total => &self.total,
            TotalsKind::Closing => &self.closing,
        }
    }

    /// Books a line dated before the range.
    pub fn add_opening(&mut self, entry: &LedgerEntry) -> Result<(), ReportError> {
        self.opening.add(entry)?;
        self.closing.add(entry)
    }

    /// Books a line dated within the range.
    pub fn add_movement(&mut self, entry: &LedgerEntry) -> Result<(), ReportError> {
        self.total.add(entry)?;
        self.closing.add(entry)
    }
}

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Link to a named record.
    Link,
    /// Calendar date.
    Date,
    /// Monetary amount.
    Currency,
    /// Plain text.
    Data,
    /// Link whose target type is held in another column.
    #[serde(rename = "Dynamic Link")]
    DynamicLink,
}

/// Output column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Display label.
    pub label: String,
    /// Row field shown in the column.
    pub fieldname: String,
    /// Data type, `None` for untyped text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fieldtype: Option<FieldType>,
    /// Linked record type, or the field holding the currency/link type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    /// Display width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Hidden columns are carried but not displayed.
    #[serde(default)]
    pub hidden: bool,
}

impl Column {
    /// Creates an untyped visible column.
    #[must_use]
    pub fn new(label: impl Into<String>, fieldname: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            fieldname: fieldname.into(),
            fieldtype: None,
            options: None,
            width: None,
            hidden: false,
        }
    }

    /// Sets the data type.
    #[must_use]
    pub const fn typed(mut self, fieldtype: FieldType) -> Self {
        self.fieldtype = Some(fieldtype);
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Sets the display width.
    #[must_use]
    pub const fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Hides the column.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A labelled opening/total/closing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtotal {
    /// Which accumulator is shown.
    pub kind: TotalsKind,
    /// Translated label, displayed in the account column.
    #[serde(rename = "account")]
    pub label: String,
    /// The accumulated amounts.
    #[serde(flatten)]
    pub amounts: Accumulator,
}

/// Content of an output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowKind {
    /// A ledger line (possibly consolidated).
    Entry(Box<LedgerEntry>),
    /// Blank spacer between groups.
    Separator,
    /// Opening, total or closing sums.
    Subtotal(Subtotal),
}

/// One display row.
///
/// Serializes as a single flat record keyed by column fieldname. The
/// row-level `account_currency` stands in for the line's own, so entry rows
/// carry theirs cleared (see [`apply_running_balance`]).
///
/// [`apply_running_balance`]: crate::reports::general_ledger::rows::apply_running_balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Row content.
    #[serde(flatten)]
    pub row: RowKind,
    /// Running balance.
    pub balance: Decimal,
    /// Resolved account currency.
    pub account_currency: Option<String>,
    /// Presentation currency.
    pub presentation_currency: Option<String>,
}

impl OutputRow {
    /// Wraps row content with a zero balance.
    #[must_use]
    pub const fn new(row: RowKind) -> Self {
        Self {
            row,
            balance: Decimal::ZERO,
            account_currency: None,
            presentation_currency: None,
        }
    }

    /// Posting date; synthetic rows have none.
    #[must_use]
    pub fn posting_date(&self) -> Option<NaiveDate> {
        match &self.row {
            RowKind::Entry(entry) => Some(entry.posting_date),
            RowKind::Separator | RowKind::Subtotal(_) => None,
        }
    }

    /// Debit shown on the row.
    #[must_use]
    pub fn debit(&self) -> Decimal {
        match &self.row {
            RowKind::Entry(entry) => entry.debit,
            RowKind::Subtotal(subtotal) => subtotal.amounts.debit,
            RowKind::Separator => Decimal::ZERO,
        }
    }

    /// Credit shown on the row.
    #[must_use]
    pub fn credit(&self) -> Decimal {
        match &self.row {
            RowKind::Entry(entry) => entry.credit,
            RowKind::Subtotal(subtotal) => subtotal.amounts.credit,
            RowKind::Separator => Decimal::ZERO,
        }
    }

    /// The ledger line, if this is an entry row.
    #[must_use]
    pub fn entry(&self) -> Option<&LedgerEntry> {
        match &self.row {
            RowKind::Entry(entry) => Some(entry.as_ref()),
            RowKind::Separator | RowKind::Subtotal(_) => None,
        }
    }

    /// The subtotal, if this is a subtotal row.
    #[must_use]
    pub const fn subtotal(&self) -> Option<&Subtotal> {
        match &self.row {
            RowKind::Subtotal(subtotal) => Some(subtotal),
            RowKind::Entry(_) | RowKind::Separator => None,
        }
    }
}

/// Columns plus rows of one report execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportOutput {
    /// Column metadata.
    pub columns: Vec<Column>,
    /// Ordered display rows.
    pub rows: Vec<OutputRow>,
}
