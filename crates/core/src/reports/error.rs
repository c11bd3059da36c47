//! Report error types.

use chrono::NaiveDate;
use glreport_shared::AppError;
use thiserror::Error;

use crate::ports::PortError;

/// Errors that can occur during report generation.
///
/// Filter validation failures are raised before the ledger store is queried.
/// `Store` and `AmountOverflow` come from reading and summing ledger lines.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A mandatory filter is absent.
    #[error("{0} is mandatory")]
    MissingRequiredFilter(String),

    /// Account not found.
    #[error("Account {0} does not exist")]
    UnknownAccount(String),

    /// Party not found in its party collection.
    #[error("Invalid {party_type}: {party}")]
    UnknownParty {
        /// Party type searched.
        party_type: String,
        /// Party identifier.
        party: String,
    },

    /// Filters that cannot be combined with the chosen grouping.
    #[error("{0}")]
    InvalidGroupingCombination(String),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Explicit finance book differs from the company default while
    /// default-book entries are included.
    #[error(
        "Finance book {requested} differs from the company default {default}; uncheck 'Include Default FB Entries' to use it"
    )]
    ConflictingFinanceBook {
        /// Requested finance book.
        requested: String,
        /// Company default finance book.
        default: String,
    },

    /// Presentation currency differs from the company currency while amounts
    /// must be shown in company currency.
    #[error(
        "Presentation currency cannot be {presentation} when showing amounts in company currency {company}"
    )]
    ConflictingCurrencyDisplay {
        /// Requested presentation currency.
        presentation: String,
        /// Company currency.
        company: String,
    },

    /// Printing in account currency needs a selected account.
    #[error("Select an account to print in account currency")]
    MissingAccountForCurrencyPrint,

    /// Company not found.
    #[error("Company not found: {0}")]
    UnknownCompany(String),

    /// No report registered under the name.
    #[error("Report not found: {0}")]
    UnknownReport(String),

    /// Filters could not be parsed.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Ledger amounts summed past the decimal range.
    #[error("Ledger amounts exceed the supported range while computing {0}")]
    AmountOverflow(&'static str),

    /// A collaborator failed.
    #[error(transparent)]
    Store(#[from] PortError),
}

impl ReportError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingRequiredFilter(_) => "MISSING_REQUIRED_FILTER",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::UnknownParty { .. } => "UNKNOWN_PARTY",
            Self::InvalidGroupingCombination(_) => "INVALID_GROUPING_COMBINATION",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::ConflictingFinanceBook { .. } => "CONFLICTING_FINANCE_BOOK",
            Self::ConflictingCurrencyDisplay { .. } => "CONFLICTING_CURRENCY_DISPLAY",
            Self::MissingAccountForCurrencyPrint => "MISSING_ACCOUNT_FOR_CURRENCY_PRINT",
            Self::UnknownCompany(_) => "UNKNOWN_COMPANY",
            Self::UnknownReport(_) => "UNKNOWN_REPORT",
            Self::InvalidFilter(_) => "INVALID_FILTER",
            Self::AmountOverflow(_) => "AMOUNT_OVERFLOW",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownReport(_) | ReportError::UnknownCompany(_) => {
                Self::NotFound(err.to_string())
            }
            ReportError::Store(PortError::Unavailable(_)) => Self::ExternalService(err.to_string()),
            ReportError::Store(_) | ReportError::AmountOverflow(_) => {
                Self::Internal(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReportError::MissingRequiredFilter("Company".into()), 400)]
    #[case(ReportError::MissingAccountForCurrencyPrint, 400)]
    #[case(ReportError::UnknownReport("Trial Balance".into()), 404)]
    #[case(ReportError::UnknownCompany("Nope".into()), 404)]
    #[case(ReportError::Store(PortError::Unavailable("down".into())), 502)]
    #[case(ReportError::Store(PortError::Conversion("no rate".into())), 500)]
    #[case(ReportError::AmountOverflow("running balance"), 500)]
    fn test_maps_to_app_error(#[case] err: ReportError, #[case] status: u16) {
        let app: AppError = err.into();
        assert_eq!(app.status_code(), status);
    }

    #[test]
    fn test_messages() {
        let err = ReportError::UnknownParty {
            party_type: "Customer".into(),
            party: "CUST-9".into(),
        };
        assert_eq!(err.to_string(), "Invalid Customer: CUST-9");
        assert_eq!(err.error_code(), "UNKNOWN_PARTY");
        assert_eq!(
            ReportError::MissingRequiredFilter("Company".into()).to_string(),
            "Company is mandatory"
        );
    }
}
