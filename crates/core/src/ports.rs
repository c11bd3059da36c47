//! Collaborator interfaces consumed by the report engines.
//!
//! The engines never own ledger data. Everything they read comes through
//! these traits so the same engine runs against the in-memory snapshot used
//! by tests and the dev server, or against a database-backed adapter.
//!
//! All calls are synchronous: one report execution is a single pass with no
//! suspension points.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::currency::CurrencyMap;
use crate::dimension::AccountingDimension;
use crate::ledger::{Account, Company, LedgerEntry, TreeIndex};
use crate::reports::general_ledger::EntryQuery;

/// Error type for collaborator calls.
#[derive(Debug, Error)]
pub enum PortError {
    /// The collaborator could not be reached.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator rejected or failed the request.
    #[error("Query failed: {0}")]
    Query(String),

    /// Currency conversion could not be completed.
    #[error("Currency conversion failed: {0}")]
    Conversion(String),
}

/// Read access to posted ledger lines and the documents around them.
pub trait LedgerStore: Send + Sync {
    /// Returns the lines matching `query`, ordered by `query.order`.
    fn select(&self, query: &EntryQuery) -> Result<Vec<LedgerEntry>, PortError>;

    /// Account currency of any ledger line booked against the party.
    fn party_account_currency(
        &self,
        company: &str,
        party_type: &str,
        party: &str,
    ) -> Result<Option<String>, PortError>;

    /// Names of submitted journal entries of the given voucher types.
    fn journal_entries(
        &self,
        company: &str,
        voucher_types: &[&str],
        system_generated_only: bool,
    ) -> Result<Vec<String>, PortError>;

    /// Party identifier → display name for one party type.
    fn party_names(&self, party_type: &str) -> Result<HashMap<String, String>, PortError>;

    /// Submitted purchase invoice → supplier bill number.
    fn supplier_bill_numbers(&self) -> Result<HashMap<String, String>, PortError>;
}

/// Read access to masters: companies, accounts, parties, hierarchies, dimensions.
pub trait MasterData: Send + Sync {
    /// Looks up a company.
    fn company(&self, name: &str) -> Result<Option<Company>, PortError>;

    /// All accounts.
    fn accounts(&self) -> Result<Vec<Account>, PortError>;

    /// Whether a record of `entity_type` named `name` exists.
    fn exists(&self, entity_type: &str, name: &str) -> Result<bool, PortError>;

    /// The party's own default currency.
    fn party_default_currency(
        &self,
        party_type: &str,
        party: &str,
    ) -> Result<Option<String>, PortError>;

    /// Subtree index for a tree-structured document type, `None` if flat.
    fn tree(&self, document_type: &str) -> Result<Option<TreeIndex>, PortError>;

    /// Configured accounting dimensions, disabled ones included.
    fn accounting_dimensions(&self) -> Result<Vec<AccountingDimension>, PortError>;
}

/// Presentation-currency conversion.
pub trait CurrencyConverter: Send + Sync {
    /// Conversion context for one report execution.
    fn currency_map(
        &self,
        company_currency: &str,
        presentation_currency: &str,
        report_date: chrono::NaiveDate,
    ) -> CurrencyMap {
        CurrencyMap {
            company_currency: company_currency.to_string(),
            presentation_currency: presentation_currency.to_string(),
            report_date,
        }
    }

    /// Rewrites monetary fields into the presentation currency.
    fn convert(
        &self,
        entries: Vec<LedgerEntry>,
        map: &CurrencyMap,
    ) -> Result<Vec<LedgerEntry>, PortError>;
}

/// Localization of user-facing text.
pub trait Translate: Send + Sync {
    /// Translates one piece of text.
    fn translate(&self, text: &str) -> String;
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Translate for PassThrough {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// One row-level permission: `fieldname` must be blank or one of `allowed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCondition {
    /// Field the permission applies to.
    pub fieldname: String,
    /// Values the user may see.
    pub allowed: BTreeSet<String>,
}

impl MatchCondition {
    /// Whether the line is visible under this condition.
    #[must_use]
    pub fn permits(&self, entry: &LedgerEntry) -> bool {
        match entry.field(&self.fieldname) {
            None | Some("") => true,
            Some(value) => self.allowed.contains(value),
        }
    }
}

/// Row-level access control.
pub trait AccessControl: Send + Sync {
    /// Conditions restricting which lines of `document_type` the caller sees.
    fn match_conditions(&self, document_type: &str) -> Vec<MatchCondition>;
}

/// No row-level restrictions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl AccessControl for Unrestricted {
    fn match_conditions(&self, _document_type: &str) -> Vec<MatchCondition> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_match_condition_allows_blank_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entry = LedgerEntry::new(
            "GLE-1",
            "ACME",
            "Cash",
            date,
            "Journal Entry",
            "JV-1",
            date.and_hms_opt(0, 0, 0).unwrap(),
        );
        let condition = MatchCondition {
            fieldname: "cost_center".to_string(),
            allowed: BTreeSet::from(["Main".to_string()]),
        };
        assert!(condition.permits(&entry));

        let mut tagged = entry.clone();
        tagged.cost_center = Some("Branch".to_string());
        assert!(!condition.permits(&tagged));

        tagged.cost_center = Some("Main".to_string());
        assert!(condition.permits(&tagged));
    }

    #[test]
    fn test_pass_through_translation() {
        assert_eq!(PassThrough.translate("Opening"), "Opening");
        assert!(Unrestricted.match_conditions("GL Entry").is_empty());
    }
}
