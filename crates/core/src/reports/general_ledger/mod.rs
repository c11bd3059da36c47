//! General ledger report.
//!
//! Pipeline: filters are validated ([`filters`]), lines selected
//! ([`selector`]) and optionally converted to the presentation currency,
//! then grouped and totalled ([`aggregation`]) and flattened into rows with
//! running balances ([`rows`]). The column schema ([`columns`]) depends on
//! filters and site settings only.

pub mod aggregation;
pub mod columns;
pub mod engine;
pub mod filters;
pub mod query;
pub mod rows;
pub mod selector;

#[cfg(test)]
mod aggregation_props;

pub use aggregation::{Aggregation, Aggregator, Group, Period};
pub use engine::{GENERAL_LEDGER, GeneralLedgerReport};
pub use filters::{CategorizeBy, GeneralLedgerFilters, RawFilters};
pub use query::{DateBound, EntryOrder, EntryQuery};
pub use rows::Framing;
