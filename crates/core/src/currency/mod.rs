//! Multi-currency handling: exchange rates and presentation-currency conversion.

pub mod conversion;
pub mod exchange;

pub use conversion::{CurrencyMap, RateTableConverter, convert_amount};
pub use exchange::{ExchangeRate, RateTable};
