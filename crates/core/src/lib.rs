//! Core reporting logic for the general ledger.
//!
//! This crate contains pure business logic with ZERO web dependencies.
//! Ledger data is read through the traits in [`ports`]; the [`store`]
//! module provides an in-memory implementation of them.
//!
//! # Modules
//!
//! - `ledger` - Ledger lines, masters and the hierarchy index
//! - `currency` - Exchange rates and presentation-currency conversion
//! - `dimension` - Accounting dimensions and dimensional filtering
//! - `ports` - Collaborator interfaces
//! - `reports` - Report registry and the general ledger engine
//! - `store` - In-memory collaborators

pub mod currency;
pub mod dimension;
pub mod ledger;
pub mod ports;
pub mod reports;
pub mod store;
