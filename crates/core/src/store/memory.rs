//! In-memory ledger store and master data.
//!
//! Serves every port from a [`LedgerSnapshot`] loaded once at startup. Used
//! by the development server and the report tests.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::currency::{ExchangeRate, RateTable};
use crate::dimension::AccountingDimension;
use crate::ledger::{Account, Company, HierarchyNode, LedgerEntry, Party, TreeError, TreeIndex};
use crate::ports::{LedgerStore, MasterData, PortError};
use crate::reports::general_ledger::EntryQuery;

/// Errors raised while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("Failed to read ledger snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for [`LedgerSnapshot`].
    #[error("Failed to parse ledger snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    /// A hierarchy in the snapshot is malformed.
    #[error("Invalid hierarchy in ledger snapshot: {0}")]
    Tree(#[from] TreeError),
}

/// A journal voucher header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalVoucher {
    /// Voucher number.
    pub name: String,
    /// Owning company.
    pub company: String,
    /// Journal type ("Exchange Gain Or Loss", "Credit Note", ...).
    pub voucher_type: String,
    /// Submitted vouchers are the only ones posted.
    #[serde(default = "yes")]
    pub submitted: bool,
    /// Created by the system rather than a user.
    #[serde(default)]
    pub is_system_generated: bool,
}

/// A purchase invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseInvoice {
    /// Invoice number.
    pub name: String,
    /// Supplier's own invoice number.
    #[serde(default)]
    pub bill_no: Option<String>,
    /// Submitted invoices are the only ones posted.
    #[serde(default = "yes")]
    pub submitted: bool,
}

const fn yes() -> bool {
    true
}

/// Everything the in-memory store serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSnapshot {
    /// Companies.
    pub companies: Vec<Company>,
    /// Chart of accounts.
    pub accounts: Vec<Account>,
    /// Cost center hierarchy.
    pub cost_centers: Vec<HierarchyNode>,
    /// Customers, suppliers, employees and other parties.
    pub parties: Vec<Party>,
    /// Accounting dimensions.
    pub dimensions: Vec<AccountingDimension>,
    /// Dimension values keyed by dimension document type.
    pub dimension_values: BTreeMap<String, Vec<HierarchyNode>>,
    /// Journal voucher headers.
    pub journal_entries: Vec<JournalVoucher>,
    /// Purchase invoice headers.
    pub purchase_invoices: Vec<PurchaseInvoice>,
    /// Published exchange rates.
    pub exchange_rates: Vec<ExchangeRate>,
    /// Posted ledger lines.
    pub gl_entries: Vec<LedgerEntry>,
}

/// Ledger store and master data over a snapshot.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    snapshot: LedgerSnapshot,
    trees: HashMap<String, TreeIndex>,
}

impl InMemoryLedger {
    /// Indexes a snapshot.
    pub fn new(snapshot: LedgerSnapshot) -> Result<Self, SnapshotError> {
        let mut trees = HashMap::new();
        trees.insert(
            "Account".to_string(),
            TreeIndex::from_parents(
                snapshot
                    .accounts
                    .iter()
                    .map(|a| (a.name.clone(), a.parent_account.clone())),
            )?,
        );
        trees.insert(
            "Cost Center".to_string(),
            hierarchy(&snapshot.cost_centers)?,
        );
        for (document_type, nodes) in &snapshot.dimension_values {
            trees.insert(document_type.clone(), hierarchy(nodes)?);
        }
        Ok(Self { snapshot, trees })
    }

    /// Parses and indexes a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Reads, parses and indexes a JSON snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let ledger = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            companies = ledger.snapshot.companies.len(),
            entries = ledger.snapshot.gl_entries.len(),
            "loaded ledger snapshot"
        );
        Ok(ledger)
    }

    /// Exchange rates of the snapshot.
    #[must_use]
    pub fn rate_table(&self) -> RateTable {
        RateTable::new(self.snapshot.exchange_rates.iter().cloned())
    }
}

fn hierarchy(nodes: &[HierarchyNode]) -> Result<TreeIndex, TreeError> {
    TreeIndex::from_parents(nodes.iter().map(|n| (n.name.clone(), n.parent.clone())))
}

impl LedgerStore for InMemoryLedger {
    fn select(&self, query: &EntryQuery) -> Result<Vec<LedgerEntry>, PortError> {
        Ok(query.apply(&self.snapshot.gl_entries))
    }

    fn party_account_currency(
        &self,
        company: &str,
        party_type: &str,
        party: &str,
    ) -> Result<Option<String>, PortError> {
        Ok(self
            .snapshot
            .gl_entries
            .iter()
            .find(|e| {
                e.company == company
                    && e.party_type.as_deref() == Some(party_type)
                    && e.party.as_deref() == Some(party)
            })
            .and_then(|e| e.account_currency.clone()))
    }

    fn journal_entries(
        &self,
        company: &str,
        voucher_types: &[&str],
        system_generated_only: bool,
    ) -> Result<Vec<String>, PortError> {
        Ok(self
            .snapshot
            .journal_entries
            .iter()
            .filter(|j| {
                j.submitted
                    && j.company == company
                    && voucher_types.contains(&j.voucher_type.as_str())
                    && (!system_generated_only || j.is_system_generated)
            })
            .map(|j| j.name.clone())
            .collect())
    }

    fn party_names(&self, party_type: &str) -> Result<HashMap<String, String>, PortError> {
        Ok(self
            .snapshot
            .parties
            .iter()
            .filter(|p| p.party_type == party_type)
            .map(|p| {
                let display = p.display_name.clone().unwrap_or_else(|| p.name.clone());
                (p.name.clone(), display)
            })
            .collect())
    }

    fn supplier_bill_numbers(&self) -> Result<HashMap<String, String>, PortError> {
        Ok(self
            .snapshot
            .purchase_invoices
            .iter()
            .filter(|p| p.submitted)
            .filter_map(|p| match p.bill_no.as_deref() {
                Some(bill) if !bill.is_empty() => Some((p.name.clone(), bill.to_string())),
                _ => None,
            })
            .collect())
    }
}

impl MasterData for InMemoryLedger {
    fn company(&self, name: &str) -> Result<Option<Company>, PortError> {
        Ok(self
            .snapshot
            .companies
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    fn accounts(&self) -> Result<Vec<Account>, PortError> {
        Ok(self.snapshot.accounts.clone())
    }

    fn exists(&self, entity_type: &str, name: &str) -> Result<bool, PortError> {
        let s = &self.snapshot;
        Ok(match entity_type {
            "Company" => s.companies.iter().any(|c| c.name == name),
            "Account" => s.accounts.iter().any(|a| a.name == name),
            "Cost Center" => s.cost_centers.iter().any(|c| c.name == name),
            other => {
                s.parties
                    .iter()
                    .any(|p| p.party_type == other && p.name == name)
                    || s.dimension_values
                        .get(other)
                        .is_some_and(|values| values.iter().any(|v| v.name == name))
            }
        })
    }

    fn party_default_currency(
        &self,
        party_type: &str,
        party: &str,
    ) -> Result<Option<String>, PortError> {
        Ok(self
            .snapshot
            .parties
            .iter()
            .find(|p| p.party_type == party_type && p.name == party)
            .and_then(|p| p.default_currency.clone()))
    }

    fn tree(&self, document_type: &str) -> Result<Option<TreeIndex>, PortError> {
        Ok(self.trees.get(document_type).cloned())
    }

    fn accounting_dimensions(&self) -> Result<Vec<AccountingDimension>, PortError> {
        Ok(self.snapshot.dimensions.clone())
    }
}
