//! Posted general-ledger lines.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One posted accounting movement as held by the ledger store.
///
/// The report engine works on owned copies; the annotation fields
/// (`party_name`, `bill_no`) are filled in during selection and never
/// written back to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier of the line.
    #[serde(rename = "gl_entry", alias = "name")]
    pub name: String,
    /// Owning company.
    pub company: String,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Account posted to.
    pub account: String,
    /// Party type (Customer, Supplier, Employee, ...).
    #[serde(default)]
    pub party_type: Option<String>,
    /// Party identifier.
    #[serde(default)]
    pub party: Option<String>,
    /// Voucher document type.
    pub voucher_type: String,
    /// Voucher subtype (e.g. "Receive", "Credit Note").
    #[serde(default)]
    pub voucher_subtype: Option<String>,
    /// Voucher number.
    pub voucher_no: String,
    /// Cost center.
    #[serde(default)]
    pub cost_center: Option<String>,
    /// Project.
    #[serde(default)]
    pub project: Option<String>,
    /// Accounting-dimension values keyed by dimension fieldname.
    ///
    /// Stored inline: any key not named above is read as a dimension value.
    #[serde(flatten)]
    pub dimensions: BTreeMap<String, String>,
    /// Debit in company currency.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit in company currency.
    #[serde(default)]
    pub credit: Decimal,
    /// Debit in account currency.
    #[serde(default)]
    pub debit_in_account_currency: Decimal,
    /// Credit in account currency.
    #[serde(default)]
    pub credit_in_account_currency: Decimal,
    /// Debit in transaction currency.
    #[serde(default)]
    pub debit_in_transaction_currency: Option<Decimal>,
    /// Credit in transaction currency.
    #[serde(default)]
    pub credit_in_transaction_currency: Option<Decimal>,
    /// Transaction currency code.
    #[serde(default)]
    pub transaction_currency: Option<String>,
    /// Account currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_currency: Option<String>,
    /// Free-text list of counter accounts.
    #[serde(default)]
    pub against: Option<String>,
    /// Document type of the voucher this line settles.
    #[serde(default)]
    pub against_voucher_type: Option<String>,
    /// Voucher this line settles.
    #[serde(default)]
    pub against_voucher: Option<String>,
    /// Opening entry flag.
    #[serde(default)]
    pub is_opening: bool,
    /// Creation timestamp, used to order lines sharing a posting date.
    pub creation: NaiveDateTime,
    /// Cancelled flag.
    #[serde(default)]
    pub is_cancelled: bool,
    /// Finance book the line belongs to (blank = all books).
    #[serde(default)]
    pub finance_book: Option<String>,
    /// Remarks.
    #[serde(default)]
    pub remarks: Option<String>,
    /// Resolved party display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_name: Option<String>,
    /// Supplier invoice number of the settled purchase invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bill_no: Option<String>,
}

impl LedgerEntry {
    /// Creates a zero-amount line with the mandatory fields set.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        account: impl Into<String>,
        posting_date: NaiveDate,
        voucher_type: impl Into<String>,
        voucher_no: impl Into<String>,
        creation: NaiveDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            posting_date,
            account: account.into(),
            party_type: None,
            party: None,
            voucher_type: voucher_type.into(),
            voucher_subtype: None,
            voucher_no: voucher_no.into(),
            cost_center: None,
            project: None,
            dimensions: BTreeMap::new(),
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            debit_in_account_currency: Decimal::ZERO,
            credit_in_account_currency: Decimal::ZERO,
            debit_in_transaction_currency: None,
            credit_in_transaction_currency: None,
            transaction_currency: None,
            account_currency: None,
            against: None,
            against_voucher_type: None,
            against_voucher: None,
            is_opening: false,
            creation,
            is_cancelled: false,
            finance_book: None,
            remarks: None,
            party_name: None,
            bill_no: None,
        }
    }

    /// Sets debit and credit, mirrored into the account-currency amounts.
    #[must_use]
    pub fn with_amounts(mut self, debit: Decimal, credit: Decimal) -> Self {
        self.debit = debit;
        self.credit = credit;
        self.debit_in_account_currency = debit;
        self.credit_in_account_currency = credit;
        self
    }

    /// Sets the party.
    #[must_use]
    pub fn with_party(mut self, party_type: impl Into<String>, party: impl Into<String>) -> Self {
        self.party_type = Some(party_type.into());
        self.party = Some(party.into());
        self
    }

    /// Marks the line as an opening entry.
    #[must_use]
    pub const fn opening(mut self) -> Self {
        self.is_opening = true;
        self
    }

    /// Sets an accounting-dimension value.
    #[must_use]
    pub fn with_dimension(mut self, fieldname: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(fieldname.into(), value.into());
        self
    }

    /// Looks up a filterable field by fieldname.
    ///
    /// Unknown fieldnames fall through to the accounting dimensions.
    #[must_use]
    pub fn field(&self, fieldname: &str) -> Option<&str> {
        match fieldname {
            "company" => Some(self.company.as_str()),
            "account" => Some(self.account.as_str()),
            "party_type" => self.party_type.as_deref(),
            "party" => self.party.as_deref(),
            "voucher_type" => Some(self.voucher_type.as_str()),
            "voucher_no" => Some(self.voucher_no.as_str()),
            "cost_center" => self.cost_center.as_deref(),
            "project" => self.project.as_deref(),
            "finance_book" => self.finance_book.as_deref(),
            "against_voucher" => self.against_voucher.as_deref(),
            other => self.dimensions.get(other).map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        LedgerEntry::new(
            "GLE-0001",
            "ACME",
            "Debtors",
            date,
            "Sales Invoice",
            "SINV-0001",
            date.and_hms_opt(9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_field_lookup_covers_columns_and_dimensions() {
        let entry = sample()
            .with_party("Customer", "CUST-1")
            .with_dimension("branch", "North");

        assert_eq!(entry.field("account"), Some("Debtors"));
        assert_eq!(entry.field("party"), Some("CUST-1"));
        assert_eq!(entry.field("branch"), Some("North"));
        assert_eq!(entry.field("cost_center"), None);
        assert_eq!(entry.field("region"), None);
    }

    #[test]
    fn test_with_amounts_mirrors_account_currency() {
        let entry = sample().with_amounts(dec!(50), dec!(20));
        assert_eq!(entry.debit_in_account_currency, dec!(50));
        assert_eq!(entry.credit_in_account_currency, dec!(20));
    }

    #[test]
    fn test_deserializes_store_rows() {
        let json = r#"{
            "name": "GLE-9",
            "company": "ACME",
            "posting_date": "2024-01-10",
            "account": "Cash",
            "voucher_type": "Journal Entry",
            "voucher_no": "JV-1",
            "debit": "12.50",
            "creation": "2024-01-10T08:00:00",
            "branch": "North"
        }"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name, "GLE-9");
        assert_eq!(entry.debit, dec!(12.50));
        assert!(!entry.is_opening);
        assert_eq!(entry.field("branch"), Some("North"));
        assert_eq!(entry.dimensions.len(), 1);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["gl_entry"], "GLE-9");
        assert_eq!(json["branch"], "North");
        assert!(json.get("dimensions").is_none());
        assert!(json.get("account_currency").is_none());
    }
}
