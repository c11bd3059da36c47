//! Entry selection: builds the predicate from validated filters, runs it
//! against the ledger store and annotates the returned lines.

use std::collections::{BTreeSet, HashMap};

use glreport_shared::ReportSettings;
use tracing::debug;

use super::filters::{CategorizeBy, GeneralLedgerFilters};
use super::query::{DateBound, EntryOrder, EntryQuery};
use crate::dimension::AccountingDimension;
use crate::ledger::{Company, LedgerEntry};
use crate::ports::{AccessControl, LedgerStore, MasterData};
use crate::reports::error::ReportError;

const GL_ENTRY: &str = "GL Entry";
const EXCHANGE_JOURNALS: [&str; 2] = ["Exchange Rate Revaluation", "Exchange Gain Or Loss"];
const NOTE_JOURNALS: [&str; 2] = ["Credit Note", "Debit Note"];
const NAMED_PARTY_TYPES: [&str; 3] = ["Customer", "Supplier", "Employee"];

/// Selects the ledger lines a report execution works on.
pub struct EntrySelector<'a> {
    store: &'a dyn LedgerStore,
    master: &'a dyn MasterData,
    access: &'a dyn AccessControl,
    settings: &'a ReportSettings,
}

impl<'a> EntrySelector<'a> {
    /// Creates a selector over the given collaborators.
    #[must_use]
    pub fn new(
        store: &'a dyn LedgerStore,
        master: &'a dyn MasterData,
        access: &'a dyn AccessControl,
        settings: &'a ReportSettings,
    ) -> Self {
        Self {
            store,
            master,
            access,
            settings,
        }
    }

    /// Builds the selection predicate.
    pub fn build_query(
        &self,
        filters: &GeneralLedgerFilters,
        company: &Company,
        dimensions: &[AccountingDimension],
    ) -> Result<EntryQuery, ReportError> {
        let strict_dates = self.settings.ignore_is_opening_check_for_reporting;
        let mut query = EntryQuery::new(
            filters.company.clone(),
            DateBound {
                date: filters.to_date,
                or_opening: !strict_dates,
            },
        );
        query.order = EntryOrder::for_filters(filters.categorize_by, filters.include_dimensions);
        query.finance_books = finance_books(filters, company)?;

        if !filters.accounts.is_empty() {
            query.accounts = Some(self.subtrees("Account", &filters.accounts)?);
        }
        if !filters.cost_centers.is_empty() {
            query.cost_centers = Some(self.subtrees("Cost Center", &filters.cost_centers)?);
        }
        query.voucher_no.clone_from(&filters.voucher_no);
        query.against_voucher.clone_from(&filters.against_voucher_no);

        if filters.ignore_err {
            query.excluded_vouchers.extend(self.store.journal_entries(
                &filters.company,
                &EXCHANGE_JOURNALS,
                false,
            )?);
        }
        if filters.ignore_cr_dr_notes {
            query.excluded_vouchers.extend(self.store.journal_entries(
                &filters.company,
                &NOTE_JOURNALS,
                true,
            )?);
        }

        if let Some(party_type) = &filters.party_type {
            query.party_types = Some(BTreeSet::from([party_type.clone()]));
        } else if filters.categorize_by == Some(CategorizeBy::Party) {
            query.party_types = Some(BTreeSet::from([
                "Customer".to_string(),
                "Supplier".to_string(),
            ]));
        }
        if !filters.parties.is_empty() {
            query.parties = Some(filters.parties.iter().cloned().collect());
        }

        // Account- or party-scoped reports read history before `from_date`.
        let scoped = !filters.accounts.is_empty()
            || !filters.parties.is_empty()
            || matches!(
                filters.categorize_by,
                Some(CategorizeBy::Account | CategorizeBy::Party)
            );
        if !scoped {
            query.from = Some(DateBound {
                date: filters.from_date,
                or_opening: !strict_dates,
            });
        }

        if !filters.projects.is_empty() {
            query.projects = Some(filters.projects.iter().cloned().collect());
        }

        query.include_cancelled = filters.show_cancelled_entries;
        query.match_conditions = self.access.match_conditions(GL_ENTRY);

        for dimension in dimensions.iter().filter(|d| d.is_filterable()) {
            let Some(values) = filters.dimensions.get(&dimension.fieldname) else {
                continue;
            };
            let allowed = if dimension.is_tree {
                self.subtrees(&dimension.document_type, values)?
            } else {
                values.iter().cloned().collect()
            };
            query.dimensions.push((dimension.fieldname.clone(), allowed));
        }

        Ok(query)
    }

    /// Selects and annotates the lines for a report execution.
    pub fn select(
        &self,
        filters: &GeneralLedgerFilters,
        company: &Company,
        dimensions: &[AccountingDimension],
    ) -> Result<Vec<LedgerEntry>, ReportError> {
        let query = self.build_query(filters, company, dimensions)?;
        debug!(
            company = %query.company,
            order = ?query.order,
            excluded = query.excluded_vouchers.len(),
            "selecting ledger entries"
        );
        let mut entries = self.store.select(&query)?;

        let mut party_names = HashMap::new();
        for party_type in NAMED_PARTY_TYPES {
            party_names.insert(party_type, self.store.party_names(party_type)?);
        }
        let bill_numbers = self.store.supplier_bill_numbers()?;
        let remarks_limit = self.settings.remarks_limit();

        for entry in &mut entries {
            if let (Some(party_type), Some(party)) = (&entry.party_type, &entry.party) {
                entry.party_name = party_names
                    .get(party_type.as_str())
                    .and_then(|names| names.get(party))
                    .cloned();
            }
            entry.bill_no = Some(
                entry
                    .against_voucher
                    .as_ref()
                    .and_then(|voucher| bill_numbers.get(voucher))
                    .cloned()
                    .unwrap_or_default(),
            );

            if !filters.show_remarks {
                entry.remarks = None;
            } else if let (Some(limit), Some(remarks)) = (remarks_limit, entry.remarks.as_mut()) {
                if let Some((cut, _)) = remarks.char_indices().nth(limit) {
                    remarks.truncate(cut);
                }
            }
            if !filters.add_values_in_transaction_currency {
                entry.debit_in_transaction_currency = None;
                entry.credit_in_transaction_currency = None;
                entry.transaction_currency = None;
            }
            if !filters.include_dimensions {
                entry.dimensions.clear();
            }
        }

        debug!(entries = entries.len(), "selected ledger entries");
        Ok(entries)
    }

    fn subtrees(&self, document_type: &str, roots: &[String]) -> Result<BTreeSet<String>, ReportError> {
        Ok(match self.master.tree(document_type)? {
            Some(tree) => tree.descendants_of(roots),
            None => roots.iter().cloned().collect(),
        })
    }
}

/// Non-blank finance books a line may carry.
fn finance_books(
    filters: &GeneralLedgerFilters,
    company: &Company,
) -> Result<BTreeSet<String>, ReportError> {
    let requested = filters.finance_book.clone();
    if !filters.include_default_book_entries {
        return Ok(requested.into_iter().collect());
    }
    match (requested, company.default_finance_book.clone()) {
        (Some(requested), Some(default)) if requested != default => {
            Err(ReportError::ConflictingFinanceBook { requested, default })
        }
        (Some(book), _) | (None, Some(book)) => Ok(BTreeSet::from([book])),
        (None, None) => Ok(BTreeSet::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AccountIndex;
    use crate::ports::{PortError, Unrestricted};
    use crate::store::{InMemoryLedger, LedgerSnapshot};
    use crate::reports::general_ledger::filters::{RawFilters, validate_filters};
    use chrono::NaiveDate;

    fn company(default_book: Option<&str>) -> Company {
        Company {
            name: "ACME".to_string(),
            default_currency: "USD".to_string(),
            default_finance_book: default_book.map(str::to_string),
        }
    }

    fn filters() -> GeneralLedgerFilters {
        let raw = RawFilters::from_json(serde_json::json!({
            "company": "ACME", "from_date": "2024-01-01", "to_date": "2024-01-31"
        }))
        .unwrap();
        validate_filters(&raw, &AccountIndex::default()).unwrap()
    }

    /// Store whose every call fails.
    struct Offline;

    impl LedgerStore for Offline {
        fn select(&self, _: &EntryQuery) -> Result<Vec<LedgerEntry>, PortError> {
            Err(PortError::Unavailable("ledger".to_string()))
        }

        fn party_account_currency(&self, _: &str, _: &str, _: &str) -> Result<Option<String>, PortError> {
            Err(PortError::Unavailable("ledger".to_string()))
        }

        fn journal_entries(&self, _: &str, _: &[&str], _: bool) -> Result<Vec<String>, PortError> {
            Err(PortError::Unavailable("ledger".to_string()))
        }

        fn party_names(&self, _: &str) -> Result<HashMap<String, String>, PortError> {
            Err(PortError::Unavailable("ledger".to_string()))
        }

        fn supplier_bill_numbers(&self) -> Result<HashMap<String, String>, PortError> {
            Err(PortError::Unavailable("ledger".to_string()))
        }
    }

    #[test]
    fn test_conflicting_finance_book_fails_before_the_store_is_read() {
        let master = InMemoryLedger::new(LedgerSnapshot::default()).unwrap();
        let settings = ReportSettings::default();
        let selector = EntrySelector::new(&Offline, &master, &Unrestricted, &settings);

        let mut f = filters();
        f.ignore_err = true;
        f.ignore_cr_dr_notes = true;
        f.include_default_book_entries = true;
        f.finance_book = Some("Tax".to_string());
        assert!(matches!(
            selector.build_query(&f, &company(Some("Main")), &[]),
            Err(ReportError::ConflictingFinanceBook { .. })
        ));

        f.finance_book = None;
        assert!(matches!(
            selector.build_query(&f, &company(Some("Main")), &[]),
            Err(ReportError::Store(PortError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_finance_book_rules() {
        let mut f = filters();
        assert!(finance_books(&f, &company(Some("Main"))).unwrap().is_empty());

        f.include_default_book_entries = true;
        assert_eq!(
            finance_books(&f, &company(Some("Main"))).unwrap(),
            BTreeSet::from(["Main".to_string()])
        );

        f.finance_book = Some("Tax".to_string());
        assert!(matches!(
            finance_books(&f, &company(Some("Main"))),
            Err(ReportError::ConflictingFinanceBook { .. })
        ));
        assert_eq!(
            finance_books(&f, &company(None)).unwrap(),
            BTreeSet::from(["Tax".to_string()])
        );

        f.include_default_book_entries = false;
        assert_eq!(finance_books(&f, &company(None)).unwrap().len(), 1);
        assert_eq!(f.from_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
