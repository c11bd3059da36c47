//! Column schema.

use glreport_shared::ReportSettings;

use super::filters::GeneralLedgerFilters;
use crate::dimension::AccountingDimension;
use crate::ledger::Company;
use crate::ports::Translate;
use crate::reports::error::ReportError;
use crate::reports::types::{Column, FieldType};

/// Resolves the presentation currency and derives the output columns.
///
/// Sets `filters.presentation_currency` to the company currency when none
/// was requested.
pub fn build_columns(
    filters: &mut GeneralLedgerFilters,
    company: &Company,
    dimensions: &[AccountingDimension],
    settings: &ReportSettings,
    tr: &dyn Translate,
) -> Result<Vec<Column>, ReportError> {
    let currency = filters
        .presentation_currency
        .get_or_insert_with(|| company.default_currency.clone())
        .clone();

    if filters.show_amount_in_company_currency && currency != company.default_currency {
        return Err(ReportError::ConflictingCurrencyDisplay {
            presentation: currency,
            company: company.default_currency.clone(),
        });
    }

    let amount = |label: &str, fieldname: &str| {
        Column::new(format!("{} ({currency})", tr.translate(label)), fieldname)
            .typed(FieldType::Currency)
            .options("presentation_currency")
            .width(130)
    };

    let mut columns = vec![
        Column::new(tr.translate("GL Entry"), "gl_entry")
            .typed(FieldType::Link)
            .options("GL Entry")
            .hidden(),
        Column::new(tr.translate("Posting Date"), "posting_date")
            .typed(FieldType::Date)
            .width(100),
        Column::new(tr.translate("Account"), "account")
            .typed(FieldType::Link)
            .options("Account")
            .width(180),
        amount("Debit", "debit"),
        amount("Credit", "credit"),
        amount("Balance", "balance"),
    ];

    if filters.add_values_in_transaction_currency {
        columns.extend([
            Column::new(tr.translate("Debit (Transaction)"), "debit_in_transaction_currency")
                .typed(FieldType::Currency)
                .options("transaction_currency")
                .width(130),
            Column::new(tr.translate("Credit (Transaction)"), "credit_in_transaction_currency")
                .typed(FieldType::Currency)
                .options("transaction_currency")
                .width(130),
            Column::new("Transaction Currency", "transaction_currency")
                .typed(FieldType::Link)
                .options("Currency")
                .width(70),
        ]);
    }

    columns.extend([
        Column::new(tr.translate("Voucher Type"), "voucher_type").width(120),
        Column::new(tr.translate("Voucher Subtype"), "voucher_subtype")
            .typed(FieldType::Data)
            .width(180),
        Column::new(tr.translate("Voucher No"), "voucher_no")
            .typed(FieldType::DynamicLink)
            .options("voucher_type")
            .width(180),
        Column::new(tr.translate("Against Account"), "against").width(120),
        Column::new(tr.translate("Party Type"), "party_type").width(100),
        Column::new(tr.translate("Party"), "party").width(100),
    ]);

    if settings.shows_party_name() {
        columns.push(
            Column::new(tr.translate("Party Name"), "party_name")
                .typed(FieldType::Data)
                .width(150),
        );
    }

    if filters.include_dimensions {
        columns.push(
            Column::new(tr.translate("Project"), "project")
                .options("Project")
                .width(100),
        );
        columns.extend(dimensions.iter().filter(|d| !d.disabled).map(|d| {
            Column::new(tr.translate(&d.label), d.fieldname.clone())
                .options(d.label.clone())
                .width(100)
        }));
        columns.push(
            Column::new(tr.translate("Cost Center"), "cost_center")
                .options("Cost Center")
                .width(100),
        );
    }

    columns.extend([
        Column::new(tr.translate("Against Voucher Type"), "against_voucher_type").width(100),
        Column::new(tr.translate("Against Voucher"), "against_voucher")
            .typed(FieldType::DynamicLink)
            .options("against_voucher_type")
            .width(100),
        Column::new(tr.translate("Supplier Invoice No"), "bill_no")
            .typed(FieldType::Data)
            .width(100),
    ]);

    if filters.show_remarks {
        columns.push(Column::new(tr.translate("Remarks"), "remarks").width(400));
    }

    Ok(columns)
}
