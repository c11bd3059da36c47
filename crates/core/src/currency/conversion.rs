//! Presentation-currency conversion.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to a fixed number of decimal places
//! - Use banker's rounding (round half to even)
//! - Leave account-currency amounts untouched

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use super::exchange::RateTable;
use crate::ledger::LedgerEntry;
use crate::ports::{CurrencyConverter, PortError};

/// Decimal places kept after conversion.
pub const CONVERSION_PRECISION: u32 = 4;

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
/// Returns `None` when the product leaves the decimal range.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Option<Decimal> {
    let converted = amount.checked_mul(rate)?;
    Some(converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven))
}

/// Conversion context for one report execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMap {
    /// Company (functional) currency.
    pub company_currency: String,
    /// Currency amounts are presented in.
    pub presentation_currency: String,
    /// Date whose rate applies to every line.
    pub report_date: NaiveDate,
}

/// Converts company-currency amounts with a dated rate table.
#[derive(Debug, Clone, Default)]
pub struct RateTableConverter {
    rates: RateTable,
}

impl RateTableConverter {
    /// Creates a converter over the given rates.
    #[must_use]
    pub const fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    fn rate(&self, map: &CurrencyMap) -> Result<Decimal, PortError> {
        self.rates
            .rate_on(
                &map.company_currency,
                &map.presentation_currency,
                map.report_date,
            )
            .ok_or_else(|| {
                PortError::Conversion(format!(
                    "no exchange rate from {} to {} on {}",
                    map.company_currency, map.presentation_currency, map.report_date
                ))
            })
    }
}

impl CurrencyConverter for RateTableConverter {
    /// When every line shares one account currency equal to the presentation
    /// currency, the account-currency amounts are shown as-is. Otherwise the
    /// company-currency amounts are converted at the report date's rate,
    /// which is only looked up once a non-zero amount needs it.
    fn convert(
        &self,
        mut entries: Vec<LedgerEntry>,
        map: &CurrencyMap,
    ) -> Result<Vec<LedgerEntry>, PortError> {
        if entries.is_empty() {
            return Ok(entries);
        }
        let account_currencies: BTreeSet<Option<&str>> = entries
            .iter()
            .map(|e| e.account_currency.as_deref())
            .collect();
        let uniform_presentation = account_currencies.len() == 1
            && account_currencies.contains(&Some(map.presentation_currency.as_str()));

        if uniform_presentation {
            for entry in &mut entries {
                entry.debit = entry.debit_in_account_currency;
                entry.credit = entry.credit_in_account_currency;
            }
            return Ok(entries);
        }

        let mut cached = None;
        for entry in &mut entries {
            for amount in [&mut entry.debit, &mut entry.credit] {
                let value = *amount;
                if value.is_zero() {
                    continue;
                }
                let rate = match cached {
                    Some(rate) => rate,
                    None => {
                        let rate = self.rate(map)?;
                        cached = Some(rate);
                        rate
                    }
                };
                *amount = convert_amount(value, rate, CONVERSION_PRECISION).ok_or_else(|| {
                    PortError::Conversion(format!(
                        "{value} {} exceeds the supported range in {}",
                        map.company_currency, map.presentation_currency
                    ))
                })?;
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::ExchangeRate;
    use rust_decimal_macros::dec;

    fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    fn entry(account_currency: &str, debit: Decimal, debit_in_account: Decimal) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mut entry = LedgerEntry::new(
            "GLE-1",
            "ACME",
            "Bank",
            date,
            "Journal Entry",
            "JV-1",
            date.and_hms_opt(0, 0, 0).unwrap(),
        );
        entry.debit = debit;
        entry.debit_in_account_currency = debit_in_account;
        entry.account_currency = Some(account_currency.to_string());
        entry
    }

    fn map(presentation: &str) -> CurrencyMap {
        CurrencyMap {
            company_currency: "USD".to_string(),
            presentation_currency: presentation.to_string(),
            report_date: report_date(),
        }
    }

    #[test]
    fn test_convert_amount() {
        // 100 USD * 15000 = 1,500,000 IDR
        assert_eq!(convert_amount(dec!(100), dec!(15000), 0), Some(dec!(1500000)));
        // 100.50 USD * 15000.5 = 1,507,550.25 IDR -> rounds to 1,507,550
        assert_eq!(convert_amount(dec!(100.50), dec!(15000.5), 0), Some(dec!(1507550)));
        assert_eq!(convert_amount(Decimal::MAX, dec!(2), 0), None);
    }

    #[test]
    fn test_bankers_rounding() {
        assert_eq!(convert_amount(dec!(1), dec!(2.5), 0), Some(dec!(2)));
        assert_eq!(convert_amount(dec!(1), dec!(3.5), 0), Some(dec!(4)));
    }

    #[test]
    fn test_uniform_account_currency_uses_account_amounts() {
        let converter = RateTableConverter::default();
        let converted = converter
            .convert(vec![entry("EUR", dec!(110), dec!(100))], &map("EUR"))
            .unwrap();
        assert_eq!(converted[0].debit, dec!(100));
    }

    #[test]
    fn test_mixed_currencies_convert_at_report_date() {
        let converter = RateTableConverter::new(RateTable::new([ExchangeRate::new(
            "USD",
            "EUR",
            dec!(0.5),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )]));
        let entries = vec![
            entry("EUR", dec!(110), dec!(100)),
            entry("USD", dec!(40), dec!(40)),
        ];

        let converted = converter.convert(entries, &map("EUR")).unwrap();
        assert_eq!(converted[0].debit, dec!(55));
        assert_eq!(converted[1].debit, dec!(20));
        assert_eq!(converted[1].credit, Decimal::ZERO);
    }

    #[test]
    fn test_missing_rate_is_an_error() {
        let converter = RateTableConverter::default();
        let entries = vec![entry("USD", dec!(10), dec!(10)), entry("GBP", dec!(1), dec!(1))];
        let err = converter.convert(entries, &map("EUR")).unwrap_err();
        assert!(matches!(err, PortError::Conversion(_)));
    }

    #[test]
    fn test_rate_is_only_needed_for_non_zero_amounts() {
        let converter = RateTableConverter::default();
        assert!(converter.convert(Vec::new(), &map("EUR")).unwrap().is_empty());

        let entries = vec![
            entry("USD", Decimal::ZERO, Decimal::ZERO),
            entry("GBP", Decimal::ZERO, Decimal::ZERO),
        ];
        let converted = converter.convert(entries, &map("EUR")).unwrap();
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|e| e.debit.is_zero() && e.credit.is_zero()));
    }
}
