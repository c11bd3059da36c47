//! Master records the report reads alongside ledger lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Account types whose balances are tracked per party.
const PARTY_ACCOUNT_TYPES: [&str; 2] = ["Receivable", "Payable"];

/// Party types that carry no default billing currency.
pub const CURRENCYLESS_PARTY_TYPES: [&str; 3] = ["Employee", "Shareholder", "Member"];

/// A company and its accounting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company name.
    pub name: String,
    /// Functional currency.
    pub default_currency: String,
    /// Finance book used when default-book entries are included.
    #[serde(default)]
    pub default_finance_book: Option<String>,
}

/// A chart-of-accounts node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account name (unique across companies).
    pub name: String,
    /// Owning company.
    pub company: String,
    /// Parent group account.
    #[serde(default)]
    pub parent_account: Option<String>,
    /// Group accounts only aggregate children.
    #[serde(default)]
    pub is_group: bool,
    /// Account type (Receivable, Payable, Bank, ...).
    #[serde(default)]
    pub account_type: Option<String>,
    /// Account currency, when different from the company's.
    #[serde(default)]
    pub account_currency: Option<String>,
}

impl Account {
    /// True for Receivable and Payable accounts.
    #[must_use]
    pub fn is_party_account(&self) -> bool {
        self.account_type
            .as_deref()
            .is_some_and(|t| PARTY_ACCOUNT_TYPES.contains(&t))
    }
}

/// Accounts indexed by name.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    accounts: HashMap<String, Account>,
}

impl AccountIndex {
    /// Builds the index from a list of accounts.
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.name.clone(), account))
                .collect(),
        }
    }

    /// Whether the account exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Group flag of an account, `None` if unknown.
    #[must_use]
    pub fn is_group(&self, name: &str) -> Option<bool> {
        self.accounts.get(name).map(|a| a.is_group)
    }

    /// Currency of an account, falling back to the company currency.
    #[must_use]
    pub fn currency_of(&self, name: &str, company_currency: &str) -> String {
        self.accounts
            .get(name)
            .and_then(|a| a.account_currency.clone())
            .unwrap_or_else(|| company_currency.to_string())
    }

    /// Names of the company's Receivable and Payable accounts.
    #[must_use]
    pub fn party_accounts(&self, company: &str) -> Vec<String> {
        self.accounts
            .values()
            .filter(|a| a.company == company && a.is_party_account())
            .map(|a| a.name.clone())
            .collect()
    }
}

/// A customer, supplier, employee or other counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Party type.
    pub party_type: String,
    /// Party identifier.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Default billing currency.
    #[serde(default)]
    pub default_currency: Option<String>,
}

/// A node of a parent-linked hierarchy (cost centers, dimension values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Node name.
    pub name: String,
    /// Parent node name.
    #[serde(default)]
    pub parent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, account_type: Option<&str>, currency: Option<&str>) -> Account {
        Account {
            name: name.to_string(),
            company: "ACME".to_string(),
            parent_account: None,
            is_group: false,
            account_type: account_type.map(str::to_string),
            account_currency: currency.map(str::to_string),
        }
    }

    #[test]
    fn test_party_accounts_are_receivable_or_payable() {
        let index = AccountIndex::new([
            account("Debtors", Some("Receivable"), None),
            account("Creditors", Some("Payable"), None),
            account("Cash", Some("Cash"), None),
        ]);

        let mut names = index.party_accounts("ACME");
        names.sort();
        assert_eq!(names, vec!["Creditors", "Debtors"]);
        assert!(index.party_accounts("Other Co").is_empty());
    }

    #[test]
    fn test_currency_falls_back_to_company() {
        let index = AccountIndex::new([
            account("Cash", None, None),
            account("Bank EUR", None, Some("EUR")),
        ]);

        assert_eq!(index.currency_of("Cash", "USD"), "USD");
        assert_eq!(index.currency_of("Bank EUR", "USD"), "EUR");
        assert_eq!(index.is_group("Cash"), Some(false));
        assert_eq!(index.is_group("Missing"), None);
    }
}
