//! Exchange rate types and lookup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub fn new(
        from_currency: impl Into<String>,
        to_currency: impl Into<String>,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            rate,
            effective_date,
        }
    }

    /// Returns the inverse rate, `None` for a zero rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let rate = Decimal::ONE.checked_div(self.rate)?;
        Some(Self {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate,
            effective_date: self.effective_date,
        })
    }
}

/// Dated exchange rates; the latest rate effective on a date wins.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: Vec<ExchangeRate>,
}

impl RateTable {
    /// Builds a table from published rates.
    pub fn new(rates: impl IntoIterator<Item = ExchangeRate>) -> Self {
        let mut rates: Vec<ExchangeRate> = rates.into_iter().collect();
        rates.sort_by_key(|r| r.effective_date);
        Self { rates }
    }

    /// Rate converting `from` into `to` effective on `date`.
    ///
    /// A direct quote is preferred; otherwise the inverse of the reverse
    /// quote is used.
    #[must_use]
    pub fn rate_on(&self, from: &str, to: &str, date: NaiveDate) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.latest(from, to, date)
            .map(|r| r.rate)
            .or_else(|| {
                self.latest(to, from, date)
                    .and_then(ExchangeRate::inverse)
                    .map(|r| r.rate)
            })
    }

    fn latest(&self, from: &str, to: &str, date: NaiveDate) -> Option<&ExchangeRate> {
        self.rates
            .iter()
            .rev()
            .find(|r| r.from_currency == from && r.to_currency == to && r.effective_date <= date)
    }
}
