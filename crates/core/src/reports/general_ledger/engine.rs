//! General ledger report engine.

use std::sync::Arc;

use glreport_shared::ReportSettings;
use tracing::{debug, info, warn};

use super::aggregation::Aggregator;
use super::columns::build_columns;
use super::filters::{
    RawFilters, dimension_filter, set_account_currency, validate_filters, validate_party,
};
use super::rows::{apply_running_balance, materialize};
use super::selector::EntrySelector;
use crate::dimension::AccountingDimension;
use crate::ledger::AccountIndex;
use crate::ports::{
    AccessControl, CurrencyConverter, LedgerStore, MasterData, PassThrough, Translate,
    Unrestricted,
};
use crate::reports::error::ReportError;
use crate::reports::registry::ReportEngine;
use crate::reports::types::ReportOutput;

/// Name the report registers under.
pub const GENERAL_LEDGER: &str = "General Ledger";

/// Ledger lines with opening, running and closing balances.
pub struct GeneralLedgerReport {
    store: Arc<dyn LedgerStore>,
    master: Arc<dyn MasterData>,
    converter: Arc<dyn CurrencyConverter>,
    translator: Arc<dyn Translate>,
    access: Arc<dyn AccessControl>,
    settings: ReportSettings,
}

impl GeneralLedgerReport {
    /// Creates the engine with pass-through translation and no row restrictions.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        master: Arc<dyn MasterData>,
        converter: Arc<dyn CurrencyConverter>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            store,
            master,
            converter,
            translator: Arc::new(PassThrough),
            access: Arc::new(Unrestricted),
            settings,
        }
    }

    /// Uses the given localization function.
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = translator;
        self
    }

    /// Uses the given row-level access control.
    #[must_use]
    pub fn with_access_control(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    /// Runs the report over parsed filters.
    pub fn run(&self, raw: &RawFilters) -> Result<ReportOutput, ReportError> {
        let accounts = AccountIndex::new(self.master.accounts()?);

        let mut filters = validate_filters(raw, &accounts).inspect_err(|e| {
            warn!(error = %e, "rejected general ledger filters");
        })?;
        validate_party(&filters, self.master.as_ref())?;

        let company = self
            .master
            .company(&filters.company)?
            .ok_or_else(|| ReportError::UnknownCompany(filters.company.clone()))?;
        set_account_currency(
            &mut filters,
            &company,
            &accounts,
            self.store.as_ref(),
            self.master.as_ref(),
        )?;

        let all_dimensions = self.master.accounting_dimensions()?;
        filters.dimensions = dimension_filter(&raw.extra, &all_dimensions)?;
        let shown_dimensions: Vec<AccountingDimension> = if filters.include_dimensions {
            all_dimensions.iter().filter(|d| !d.disabled).cloned().collect()
        } else {
            Vec::new()
        };

        let columns = build_columns(
            &mut filters,
            &company,
            &shown_dimensions,
            &self.settings,
            self.translator.as_ref(),
        )?;

        let selector = EntrySelector::new(
            self.store.as_ref(),
            self.master.as_ref(),
            self.access.as_ref(),
            &self.settings,
        );
        let mut entries = selector.select(&filters, &company, &all_dimensions)?;

        if let Some(presentation) = filters.presentation_currency.as_deref() {
            let map = self.converter.currency_map(
                &company.default_currency,
                presentation,
                filters.to_date,
            );
            entries = self.converter.convert(entries, &map)?;
        }

        let aggregator = Aggregator::new(&filters, self.translator.as_ref())
            .with_immutable_ledger(self.settings.enable_immutable_ledger)
            .with_dimension_fields(
                shown_dimensions
                    .iter()
                    .map(|d| d.fieldname.clone())
                    .collect(),
            );
        let aggregator = if filters.show_net_values_in_party_account {
            aggregator.with_party_accounts(accounts.party_accounts(&company.name))
        } else {
            aggregator
        };
        let aggregation = aggregator.aggregate(entries)?;
        debug!(
            closing_debit = %aggregation.totals.closing.debit,
            closing_credit = %aggregation.totals.closing.credit,
            "computed ledger totals"
        );

        let mut rows = materialize(aggregation, &filters, self.translator.as_ref());
        apply_running_balance(
            &mut rows,
            filters.account_currency.as_deref(),
            filters.presentation_currency.as_deref(),
        )?;

        info!(
            company = %filters.company,
            columns = columns.len(),
            rows = rows.len(),
            "general ledger generated"
        );
        Ok(ReportOutput { columns, rows })
    }
}

impl ReportEngine for GeneralLedgerReport {
    fn name(&self) -> &'static str {
        GENERAL_LEDGER
    }

    /// A missing or empty filter document yields an empty report.
    fn execute(&self, filters: &serde_json::Value) -> Result<ReportOutput, ReportError> {
        let empty = match filters {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return Ok(ReportOutput::default());
        }
        let raw = RawFilters::from_json(filters.clone())?;
        self.run(&raw)
    }
}
