//! Selection predicate and sort order handed to the ledger store.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::filters::CategorizeBy;
use crate::ledger::LedgerEntry;
use crate::ports::MatchCondition;

/// Sort order of selected lines. `creation` always breaks remaining ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryOrder {
    /// `(posting_date, account, creation)`.
    #[default]
    PostingDateAccount,
    /// `(posting_date, creation)`, used when dimensions are shown.
    PostingDate,
    /// `(posting_date, voucher_type, voucher_no, creation)`.
    Voucher,
    /// `(account, posting_date, creation)`.
    AccountPostingDate,
}

impl EntryOrder {
    /// Order for the grouping mode.
    #[must_use]
    pub const fn for_filters(categorize_by: Option<CategorizeBy>, include_dimensions: bool) -> Self {
        match categorize_by {
            Some(CategorizeBy::Account) => Self::AccountPostingDate,
            Some(CategorizeBy::Voucher) => Self::Voucher,
            _ if include_dimensions => Self::PostingDate,
            _ => Self::PostingDateAccount,
        }
    }

    /// Compares two lines.
    #[must_use]
    pub fn compare(self, a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
        let primary = match self {
            Self::PostingDateAccount => a
                .posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.account.cmp(&b.account)),
            Self::PostingDate => a.posting_date.cmp(&b.posting_date),
            Self::Voucher => a
                .posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.voucher_type.cmp(&b.voucher_type))
                .then_with(|| a.voucher_no.cmp(&b.voucher_no)),
            Self::AccountPostingDate => a
                .account
                .cmp(&b.account)
                .then_with(|| a.posting_date.cmp(&b.posting_date)),
        };
        primary.then_with(|| a.creation.cmp(&b.creation))
    }
}

/// One side of the date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBound {
    /// Boundary date (inclusive).
    pub date: NaiveDate,
    /// Opening entries pass regardless of their posting date.
    pub or_opening: bool,
}

/// Conjunctive predicate over ledger lines.
///
/// `None` set filters are unrestricted; `Some` sets require membership, so a
/// line with a blank value never matches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    /// Company.
    pub company: String,
    /// Accounts, subtrees expanded.
    pub accounts: Option<BTreeSet<String>>,
    /// Cost centers, subtrees expanded.
    pub cost_centers: Option<BTreeSet<String>>,
    /// Exact voucher number.
    pub voucher_no: Option<String>,
    /// Exact settled voucher.
    pub against_voucher: Option<String>,
    /// Vouchers left out.
    pub excluded_vouchers: BTreeSet<String>,
    /// Allowed party types.
    pub party_types: Option<BTreeSet<String>>,
    /// Allowed parties.
    pub parties: Option<BTreeSet<String>>,
    /// Lower date bound.
    pub from: Option<DateBound>,
    /// Upper date bound.
    pub to: DateBound,
    /// Allowed projects.
    pub projects: Option<BTreeSet<String>>,
    /// Finance books accepted besides blank.
    pub finance_books: BTreeSet<String>,
    /// Keep cancelled lines.
    pub include_cancelled: bool,
    /// Row-level permissions.
    pub match_conditions: Vec<MatchCondition>,
    /// Allowed values per accounting dimension, subtrees expanded.
    pub dimensions: Vec<(String, BTreeSet<String>)>,
    /// Sort order.
    pub order: EntryOrder,
}

fn member(set: Option<&BTreeSet<String>>, value: Option<&str>) -> bool {
    set.is_none_or(|set| value.is_some_and(|v| set.contains(v)))
}

impl EntryQuery {
    /// Query for a company with a strict upper bound and nothing else.
    #[must_use]
    pub fn new(company: impl Into<String>, to: DateBound) -> Self {
        Self {
            company: company.into(),
            accounts: None,
            cost_centers: None,
            voucher_no: None,
            against_voucher: None,
            excluded_vouchers: BTreeSet::new(),
            party_types: None,
            parties: None,
            from: None,
            to,
            projects: None,
            finance_books: BTreeSet::new(),
            include_cancelled: false,
            match_conditions: Vec::new(),
            dimensions: Vec::new(),
            order: EntryOrder::default(),
        }
    }

    /// Whether a line satisfies every clause.
    #[must_use]
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        let within = |bound: &DateBound, inside: bool| inside || (bound.or_opening && entry.is_opening);

        entry.company == self.company
            && member(self.accounts.as_ref(), Some(&entry.account))
            && member(self.cost_centers.as_ref(), entry.cost_center.as_deref())
            && self
                .voucher_no
                .as_ref()
                .is_none_or(|v| *v == entry.voucher_no)
            && self
                .against_voucher
                .as_deref()
                .is_none_or(|v| entry.against_voucher.as_deref() == Some(v))
            && !self.excluded_vouchers.contains(&entry.voucher_no)
            && member(self.party_types.as_ref(), entry.party_type.as_deref())
            && member(self.parties.as_ref(), entry.party.as_deref())
            && self
                .from
                .as_ref()
                .is_none_or(|b| within(b, entry.posting_date >= b.date))
            && within(&self.to, entry.posting_date <= self.to.date)
            && member(self.projects.as_ref(), entry.project.as_deref())
            && entry
                .finance_book
                .as_deref()
                .is_none_or(|book| book.is_empty() || self.finance_books.contains(book))
            && (self.include_cancelled || !entry.is_cancelled)
            && self.match_conditions.iter().all(|c| c.permits(entry))
            && self
                .dimensions
                .iter()
                .all(|(field, allowed)| member(Some(allowed), entry.field(field)))
    }

    /// Filters and sorts lines. Used by stores without a native query engine.
    pub fn apply<'a>(&self, entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Vec<LedgerEntry> {
        let mut selected: Vec<LedgerEntry> = entries
            .into_iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect();
        selected.sort_by(|a, b| self.order.compare(a, b));
        selected
    }
}
