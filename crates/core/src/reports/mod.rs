//! Report engines.
//!
//! Each report implements [`ReportEngine`] and is resolved by name through
//! a [`ReportRegistry`]. The general ledger is the only report shipped.

pub mod error;
pub mod general_ledger;
pub mod registry;
pub mod types;

pub use error::ReportError;
pub use general_ledger::GeneralLedgerReport;
pub use registry::{ReportEngine, ReportRegistry};
pub use types::*;
