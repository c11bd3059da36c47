//! Reference collaborator implementations.

pub mod memory;

pub use memory::{
    InMemoryLedger, JournalVoucher, LedgerSnapshot, PurchaseInvoice, SnapshotError,
};
