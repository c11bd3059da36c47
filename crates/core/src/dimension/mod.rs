//! Accounting dimensions and dimensional filtering.

pub mod filter;
pub mod types;

pub use filter::DimensionFilter;
pub use types::{AccountingDimension, FINANCE_BOOK};
