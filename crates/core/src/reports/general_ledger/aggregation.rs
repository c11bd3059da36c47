//! Grouping and accumulation.
//!
//! Lines are classified against the report window and booked into the
//! global and per-group [`Totals`]. Pre-range lines only move opening and
//! closing sums; in-range lines move total and closing sums and become
//! visible. In consolidated-voucher mode in-range lines are instead merged
//! per [`ConsolidationKey`] and only the global sums are kept.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::debug;

use super::filters::{CategorizeBy, GeneralLedgerFilters};
use crate::ledger::LedgerEntry;
use crate::ports::Translate;
use crate::reports::error::ReportError;
use crate::reports::types::{Totals, checked_diff, checked_sum};

/// Where a line falls relative to the report window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Before `from_date`, or a suppressed opening entry.
    Opening,
    /// Within the window, or a surfaced opening entry.
    InRange,
    /// After `to_date`.
    Beyond,
}

/// Lines sharing one grouping value.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Grouping value (party, account or voucher number).
    pub key: Option<String>,
    /// Group sums.
    pub totals: Totals,
    /// Visible lines in selection order.
    pub entries: Vec<LedgerEntry>,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Report-wide sums.
    pub totals: Totals,
    /// Groups in first-encounter order.
    pub groups: Vec<Group>,
    /// Merged lines (consolidated-voucher mode only).
    pub consolidated: Vec<LedgerEntry>,
}

/// Identity of a consolidated line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConsolidationKey {
    posting_date: NaiveDate,
    voucher_type: String,
    voucher_no: String,
    account: String,
    party_type: Option<String>,
    party: Option<String>,
    creation: Option<NaiveDateTime>,
    dimensions: Vec<Option<String>>,
}

/// Builds an [`Aggregation`] from ordered lines.
pub struct Aggregator<'a> {
    filters: &'a GeneralLedgerFilters,
    translator: &'a dyn Translate,
    party_accounts: HashSet<String>,
    immutable_ledger: bool,
    dimension_fields: Vec<String>,
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator for one execution.
    #[must_use]
    pub fn new(filters: &'a GeneralLedgerFilters, translator: &'a dyn Translate) -> Self {
        Self {
            filters,
            translator,
            party_accounts: HashSet::new(),
            immutable_ledger: false,
            dimension_fields: Vec::new(),
        }
    }

    /// Receivable and Payable accounts, netted when requested.
    #[must_use]
    pub fn with_party_accounts(mut self, accounts: impl IntoIterator<Item = String>) -> Self {
        self.party_accounts = accounts.into_iter().collect();
        self
    }

    /// Keeps lines with distinct creation timestamps apart when consolidating.
    #[must_use]
    pub const fn with_immutable_ledger(mut self, immutable: bool) -> Self {
        self.immutable_ledger = immutable;
        self
    }

    /// Dimension fields that split consolidated lines.
    #[must_use]
    pub fn with_dimension_fields(mut self, fields: Vec<String>) -> Self {
        self.dimension_fields = fields;
        self
    }

    /// Classifies a line against the report window.
    #[must_use]
    pub fn classify(&self, entry: &LedgerEntry) -> Period {
        let show_opening = self.filters.show_opening_entries;
        if entry.posting_date < self.filters.from_date || (entry.is_opening && !show_opening) {
            Period::Opening
        } else if entry.posting_date <= self.filters.to_date || (entry.is_opening && show_opening) {
            Period::InRange
        } else {
            Period::Beyond
        }
    }

    /// Runs the pass.
    ///
    /// Fails with [`ReportError::AmountOverflow`] when a sum leaves the
    /// decimal range.
    pub fn aggregate(&self, entries: Vec<LedgerEntry>) -> Result<Aggregation, ReportError> {
        let consolidate = self.filters.categorize_by == Some(CategorizeBy::VoucherConsolidated);
        let mut result = Aggregation::default();
        let mut group_index: HashMap<Option<String>, usize> = HashMap::new();
        let mut merged_index: HashMap<ConsolidationKey, usize> = HashMap::new();

        for mut entry in entries {
            let key = self.group_key(&entry);
            let slot = *group_index.entry(key.clone()).or_insert_with(|| {
                result.groups.push(Group {
                    key,
                    totals: Totals::default(),
                    entries: Vec::new(),
                });
                result.groups.len() - 1
            });
            self.translate(&mut entry);

            match self.classify(&entry) {
                Period::Opening => {
                    if !consolidate {
                        result.groups[slot].totals.add_opening(&entry)?;
                    }
                    result.totals.add_opening(&entry)?;
                }
                Period::InRange if consolidate => {
                    let key = self.consolidation_key(&entry);
                    if let Some(&at) = merged_index.get(&key) {
                        self.merge(&mut result.consolidated[at], &entry)?;
                    } else {
                        merged_index.insert(key, result.consolidated.len());
                        result.consolidated.push(entry);
                    }
                }
                Period::InRange => {
                    let group = &mut result.groups[slot];
                    group.totals.add_movement(&entry)?;
                    result.totals.add_movement(&entry)?;
                    group.entries.push(entry);
                }
                Period::Beyond => {}
            }
        }

        for entry in &result.consolidated {
            result.totals.add_movement(entry)?;
        }

        debug!(
            groups = result.groups.len(),
            consolidated = result.consolidated.len(),
            "aggregated ledger entries"
        );
        Ok(result)
    }

    fn group_key(&self, entry: &LedgerEntry) -> Option<String> {
        match self.filters.categorize_by {
            Some(CategorizeBy::Party) => entry.party.clone(),
            Some(CategorizeBy::Account | CategorizeBy::VoucherConsolidated) => {
                Some(entry.account.clone())
            }
            Some(CategorizeBy::Voucher) | None => Some(entry.voucher_no.clone()),
        }
    }

    fn translate(&self, entry: &mut LedgerEntry) {
        for field in [
            &mut entry.voucher_subtype,
            &mut entry.against_voucher_type,
            &mut entry.remarks,
            &mut entry.party_type,
        ] {
            if let Some(text) = field.as_mut() {
                *text = self.translator.translate(text);
            }
        }
    }

    fn consolidation_key(&self, entry: &LedgerEntry) -> ConsolidationKey {
        let mut dimensions = Vec::new();
        if self.filters.include_dimensions {
            dimensions.extend(
                self.dimension_fields
                    .iter()
                    .map(|field| entry.dimensions.get(field).cloned()),
            );
            dimensions.push(entry.cost_center.clone());
            dimensions.push(entry.project.clone());
        }
        ConsolidationKey {
            posting_date: entry.posting_date,
            voucher_type: entry.voucher_type.clone(),
            voucher_no: entry.voucher_no.clone(),
            account: entry.account.clone(),
            party_type: entry.party_type.clone(),
            party: entry.party.clone(),
            creation: self.immutable_ledger.then_some(entry.creation),
            dimensions,
        }
    }

    /// Folds `source` into an already consolidated line.
    fn merge(&self, target: &mut LedgerEntry, source: &LedgerEntry) -> Result<(), ReportError> {
        const WHAT: &str = "consolidated vouchers";
        target.debit = checked_sum(target.debit, source.debit, WHAT)?;
        target.credit = checked_sum(target.credit, source.credit, WHAT)?;
        target.debit_in_account_currency = checked_sum(
            target.debit_in_account_currency,
            source.debit_in_account_currency,
            WHAT,
        )?;
        target.credit_in_account_currency = checked_sum(
            target.credit_in_account_currency,
            source.credit_in_account_currency,
            WHAT,
        )?;

        if self.filters.add_values_in_transaction_currency {
            target.debit_in_transaction_currency = Some(checked_sum(
                target.debit_in_transaction_currency.unwrap_or_default(),
                source.debit_in_transaction_currency.unwrap_or_default(),
                WHAT,
            )?);
            target.credit_in_transaction_currency = Some(checked_sum(
                target.credit_in_transaction_currency.unwrap_or_default(),
                source.credit_in_transaction_currency.unwrap_or_default(),
                WHAT,
            )?);
        }

        if self.filters.show_net_values_in_party_account
            && self.party_accounts.contains(&target.account)
        {
            net_single_sided(target)?;
        }

        if let (Some(into), Some(from)) = (target.against_voucher.as_mut(), &source.against_voucher)
        {
            if !into.is_empty() && !from.is_empty() {
                into.push_str(", ");
                into.push_str(from);
            }
        }
        Ok(())
    }
}

/// Collapses debit and credit into one side holding the net amount.
fn net_single_sided(entry: &mut LedgerEntry) -> Result<(), ReportError> {
    let net = checked_diff(entry.debit, entry.credit, "party net values")?;
    let net_in_account_currency = checked_diff(
        entry.debit_in_account_currency,
        entry.credit_in_account_currency,
        "party net values",
    )?;
    if net < Decimal::ZERO {
        entry.credit = net.abs();
        entry.credit_in_account_currency = net_in_account_currency.abs();
        entry.debit = Decimal::ZERO;
        entry.debit_in_account_currency = Decimal::ZERO;
    } else {
        entry.debit = net.abs();
        entry.debit_in_account_currency = net_in_account_currency.abs();
        entry.credit = Decimal::ZERO;
        entry.credit_in_account_currency = Decimal::ZERO;
    }
    Ok(())
}
