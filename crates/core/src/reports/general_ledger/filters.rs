//! Filter parsing and validation.
//!
//! Filters arrive as a loosely-typed JSON document: lists may be JSON arrays,
//! JSON-encoded strings or comma-separated text, flags may be booleans or
//! 0/1, and blank strings mean "not set". [`RawFilters`] absorbs all of that;
//! [`validate_filters`] turns it into [`GeneralLedgerFilters`], whose fields
//! are safe to act on.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dimension::{AccountingDimension, DimensionFilter};
use crate::ledger::master::CURRENCYLESS_PARTY_TYPES;
use crate::ledger::{AccountIndex, Company};
use crate::ports::{LedgerStore, MasterData};
use crate::reports::error::ReportError;

/// Report grouping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategorizeBy {
    /// One group per account.
    #[serde(rename = "Categorize by Account")]
    Account,
    /// One group per party.
    #[serde(rename = "Categorize by Party")]
    Party,
    /// One group per voucher.
    #[serde(rename = "Categorize by Voucher")]
    Voucher,
    /// Lines of one voucher merged per account and party.
    #[serde(rename = "Categorize by Voucher (Consolidated)")]
    VoucherConsolidated,
}

impl CategorizeBy {
    const ALL: [Self; 4] = [
        Self::Account,
        Self::Party,
        Self::Voucher,
        Self::VoucherConsolidated,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Account => "Categorize by Account",
            Self::Party => "Categorize by Party",
            Self::Voucher => "Categorize by Voucher",
            Self::VoucherConsolidated => "Categorize by Voucher (Consolidated)",
        }
    }

    /// Parses a display label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == label.trim())
    }
}

/// Filters exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFilters {
    /// Company name.
    #[serde(deserialize_with = "text")]
    pub company: Option<String>,
    /// Range start.
    #[serde(deserialize_with = "date")]
    pub from_date: Option<NaiveDate>,
    /// Range end.
    #[serde(deserialize_with = "date")]
    pub to_date: Option<NaiveDate>,
    /// Accounts.
    #[serde(deserialize_with = "list")]
    pub account: Vec<String>,
    /// Party type.
    #[serde(deserialize_with = "text")]
    pub party_type: Option<String>,
    /// Parties.
    #[serde(deserialize_with = "list")]
    pub party: Vec<String>,
    /// Cost centers.
    #[serde(deserialize_with = "list")]
    pub cost_center: Vec<String>,
    /// Projects.
    #[serde(deserialize_with = "list")]
    pub project: Vec<String>,
    /// Voucher number.
    #[serde(deserialize_with = "text")]
    pub voucher_no: Option<String>,
    /// Settled voucher number.
    #[serde(deserialize_with = "text")]
    pub against_voucher_no: Option<String>,
    /// Grouping label.
    #[serde(deserialize_with = "text")]
    pub categorize_by: Option<String>,
    /// Legacy spelling of `categorize_by` ("Group by ...").
    #[serde(deserialize_with = "text")]
    pub group_by: Option<String>,
    /// Requested presentation currency.
    #[serde(deserialize_with = "text")]
    pub presentation_currency: Option<String>,
    /// Show debit/credit in company currency.
    #[serde(deserialize_with = "flag")]
    pub show_amount_in_company_currency: bool,
    /// Print amounts in the account currency.
    #[serde(deserialize_with = "flag")]
    pub print_in_account_currency: bool,
    /// List opening entries as in-range movement.
    #[serde(deserialize_with = "flag")]
    pub show_opening_entries: bool,
    /// Include cancelled lines.
    #[serde(deserialize_with = "flag")]
    pub show_cancelled_entries: bool,
    /// Show and consolidate by accounting dimensions.
    #[serde(deserialize_with = "flag")]
    pub include_dimensions: bool,
    /// Add transaction-currency columns.
    #[serde(deserialize_with = "flag")]
    pub add_values_in_transaction_currency: bool,
    /// Net debit and credit on Receivable/Payable lines.
    #[serde(deserialize_with = "flag")]
    pub show_net_values_in_party_account: bool,
    /// Skip exchange-rate revaluation journals.
    #[serde(deserialize_with = "flag")]
    pub ignore_err: bool,
    /// Skip system-generated credit/debit notes.
    #[serde(deserialize_with = "flag")]
    pub ignore_cr_dr_notes: bool,
    /// Finance book.
    #[serde(deserialize_with = "text")]
    pub finance_book: Option<String>,
    /// Also include the company default finance book.
    #[serde(deserialize_with = "flag")]
    pub include_default_book_entries: bool,
    /// Show remarks.
    #[serde(deserialize_with = "flag")]
    pub show_remarks: bool,
    /// Everything else, including accounting-dimension filters.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawFilters {
    /// Parses a filter document.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ReportError> {
        serde_json::from_value(value).map_err(|e| ReportError::InvalidFilter(e.to_string()))
    }
}

/// Validated filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralLedgerFilters {
    /// Company whose ledger is reported.
    pub company: String,
    /// First day of the range.
    pub from_date: NaiveDate,
    /// Last day of the range.
    pub to_date: NaiveDate,
    /// Selected accounts (subtrees).
    pub accounts: Vec<String>,
    /// Party type of `parties`.
    pub party_type: Option<String>,
    /// Selected parties.
    pub parties: Vec<String>,
    /// Selected cost centers (subtrees).
    pub cost_centers: Vec<String>,
    /// Selected projects.
    pub projects: Vec<String>,
    /// Single voucher.
    pub voucher_no: Option<String>,
    /// Lines settling this voucher.
    pub against_voucher_no: Option<String>,
    /// Grouping mode.
    pub categorize_by: Option<CategorizeBy>,
    /// Currency amounts are shown in.
    pub presentation_currency: Option<String>,
    /// Currency of the selected account or party.
    pub account_currency: Option<String>,
    /// Show debit/credit in company currency.
    pub show_amount_in_company_currency: bool,
    /// Print amounts in the account currency.
    pub print_in_account_currency: bool,
    /// List opening entries as in-range movement.
    pub show_opening_entries: bool,
    /// Include cancelled lines.
    pub show_cancelled_entries: bool,
    /// Show and consolidate by accounting dimensions.
    pub include_dimensions: bool,
    /// Add transaction-currency columns.
    pub add_values_in_transaction_currency: bool,
    /// Net debit and credit on Receivable/Payable lines.
    pub show_net_values_in_party_account: bool,
    /// Skip exchange-rate revaluation journals.
    pub ignore_err: bool,
    /// Skip system-generated credit/debit notes.
    pub ignore_cr_dr_notes: bool,
    /// Finance book.
    pub finance_book: Option<String>,
    /// Also include the company default finance book.
    pub include_default_book_entries: bool,
    /// Show remarks.
    pub show_remarks: bool,
    /// Accounting-dimension value filters.
    pub dimensions: DimensionFilter,
}

/// Validates and canonicalizes raw filters.
///
/// Rules run in a fixed order and the first failure wins.
pub fn validate_filters(
    raw: &RawFilters,
    accounts: &AccountIndex,
) -> Result<GeneralLedgerFilters, ReportError> {
    if raw.print_in_account_currency && raw.account.is_empty() {
        return Err(ReportError::MissingAccountForCurrencyPrint);
    }

    let company = raw
        .company
        .clone()
        .ok_or_else(|| ReportError::MissingRequiredFilter("Company".to_string()))?;

    if raw.from_date.is_none() && raw.to_date.is_none() {
        return Err(ReportError::MissingRequiredFilter(
            "From Date and To Date".to_string(),
        ));
    }

    if let Some(unknown) = raw.account.iter().find(|a| !accounts.contains(a)) {
        return Err(ReportError::UnknownAccount(unknown.clone()));
    }

    let categorize_by = match raw.categorize_by.clone().or_else(|| {
        raw.group_by
            .as_ref()
            .map(|legacy| legacy.replace("Group by", "Categorize by"))
    }) {
        Some(label) => Some(CategorizeBy::from_label(&label).ok_or_else(|| {
            ReportError::InvalidFilter(format!("unknown grouping '{label}'"))
        })?),
        None => None,
    };

    if categorize_by == Some(CategorizeBy::Account)
        && raw
            .account
            .iter()
            .any(|a| accounts.is_group(a) == Some(false))
    {
        return Err(ReportError::InvalidGroupingCombination(
            "Can not filter based on Child Account, if grouped by Account".to_string(),
        ));
    }

    if raw.voucher_no.is_some() && categorize_by == Some(CategorizeBy::Voucher) {
        return Err(ReportError::InvalidGroupingCombination(
            "Can not filter based on Voucher No, if grouped by Voucher".to_string(),
        ));
    }

    let from_date = raw
        .from_date
        .ok_or_else(|| ReportError::MissingRequiredFilter("From Date".to_string()))?;
    let to_date = raw
        .to_date
        .ok_or_else(|| ReportError::MissingRequiredFilter("To Date".to_string()))?;
    if from_date > to_date {
        return Err(ReportError::InvalidDateRange {
            start: from_date,
            end: to_date,
        });
    }

    Ok(GeneralLedgerFilters {
        company,
        from_date,
        to_date,
        accounts: raw.account.clone(),
        party_type: raw.party_type.clone(),
        parties: raw.party.clone(),
        cost_centers: raw.cost_center.clone(),
        projects: raw.project.clone(),
        voucher_no: raw.voucher_no.clone(),
        against_voucher_no: raw.against_voucher_no.clone(),
        categorize_by,
        presentation_currency: raw.presentation_currency.clone(),
        account_currency: None,
        show_amount_in_company_currency: raw.show_amount_in_company_currency,
        print_in_account_currency: raw.print_in_account_currency,
        show_opening_entries: raw.show_opening_entries,
        show_cancelled_entries: raw.show_cancelled_entries,
        include_dimensions: raw.include_dimensions,
        add_values_in_transaction_currency: raw.add_values_in_transaction_currency,
        show_net_values_in_party_account: raw.show_net_values_in_party_account,
        ignore_err: raw.ignore_err,
        ignore_cr_dr_notes: raw.ignore_cr_dr_notes,
        finance_book: raw.finance_book.clone(),
        include_default_book_entries: raw.include_default_book_entries,
        show_remarks: raw.show_remarks,
        dimensions: DimensionFilter::default(),
    })
}

/// Checks every selected party exists under the selected party type.
pub fn validate_party(
    filters: &GeneralLedgerFilters,
    master: &dyn MasterData,
) -> Result<(), ReportError> {
    let Some(party_type) = filters.party_type.as_deref() else {
        return Ok(());
    };
    for party in &filters.parties {
        if !master.exists(party_type, party)? {
            warn!(party_type, party, "unknown party in filters");
            return Err(ReportError::UnknownParty {
                party_type: party_type.to_string(),
                party: party.clone(),
            });
        }
    }
    Ok(())
}

/// Resolves the account currency of a single selected account or party.
///
/// When it differs from the company currency and no presentation currency
/// was requested, amounts are presented in the account currency.
pub fn set_account_currency(
    filters: &mut GeneralLedgerFilters,
    company: &Company,
    accounts: &AccountIndex,
    store: &dyn LedgerStore,
    master: &dyn MasterData,
) -> Result<(), ReportError> {
    if filters.accounts.is_empty() && filters.parties.len() != 1 {
        return Ok(());
    }
    let company_currency = company.default_currency.as_str();

    let account_currency = if let Some((first, rest)) = filters.accounts.split_first() {
        let currency = accounts.currency_of(first, company_currency);
        rest.iter()
            .all(|a| accounts.currency_of(a, company_currency) == currency)
            .then_some(currency)
    } else if let (Some(party_type), Some(party)) =
        (filters.party_type.as_deref(), filters.parties.first())
    {
        match store.party_account_currency(&filters.company, party_type, party)? {
            Some(currency) => Some(currency),
            None if CURRENCYLESS_PARTY_TYPES.contains(&party_type) => None,
            None => master.party_default_currency(party_type, party)?,
        }
    } else {
        None
    };

    let account_currency = account_currency.unwrap_or_else(|| company_currency.to_string());
    if account_currency != company_currency && filters.presentation_currency.is_none() {
        filters.presentation_currency = Some(account_currency.clone());
    }
    filters.account_currency = Some(account_currency);
    Ok(())
}

/// Collects value filters for the enabled accounting dimensions.
pub fn dimension_filter(
    extra: &BTreeMap<String, serde_json::Value>,
    dimensions: &[AccountingDimension],
) -> Result<DimensionFilter, ReportError> {
    let mut filter = DimensionFilter::new();
    for dimension in dimensions.iter().filter(|d| d.is_filterable()) {
        if let Some(value) = extra.get(&dimension.fieldname) {
            let values = list_from_value(value).map_err(|e| {
                ReportError::InvalidFilter(format!("{}: {e}", dimension.fieldname))
            })?;
            filter.set(dimension.fieldname.clone(), values);
        }
    }
    Ok(filter)
}

/// Reads a list given as an array, a JSON-encoded array or comma-separated text.
pub fn list_from_value(value: &serde_json::Value) -> Result<Vec<String>, String> {
    use serde_json::Value;

    let keep = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(keep(s)),
                Value::Number(n) => Ok(Some(n.to_string())),
                other => Err(format!("unexpected list item {other}")),
            })
            .filter_map(Result::transpose)
            .collect(),
        Value::String(s) if s.trim_start().starts_with('[') => {
            let items: Vec<String> = serde_json::from_str(s).map_err(|e| e.to_string())?;
            Ok(items.iter().filter_map(|s| keep(s)).collect())
        }
        Value::String(s) => Ok(s.split(',').filter_map(keep).collect()),
        other => Err(format!("expected a list, got {other}")),
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    text(deserializer)?
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(de::Error::custom))
        .transpose()
}

fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    list_from_value(&value).map_err(de::Error::custom)
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true" | "Yes" | "yes"),
    })
}
