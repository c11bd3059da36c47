//! Ledger data read by the reports.
//!
//! - Posted ledger lines
//! - Master records (companies, accounts, parties, hierarchy nodes)
//! - Nested-set tree index for hierarchical filters

pub mod entry;
pub mod master;
pub mod tree;

pub use entry::LedgerEntry;
pub use master::{Account, AccountIndex, Company, HierarchyNode, Party};
pub use tree::{Bounds, TreeError, TreeIndex};
