//! Accounting dimension definitions.

use serde::{Deserialize, Serialize};

/// Document type whose dimension is handled by the finance-book rule instead.
pub const FINANCE_BOOK: &str = "Finance Book";

/// A user-configured classification axis attached to ledger lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingDimension {
    /// Field name on the ledger line (e.g. `branch`).
    pub fieldname: String,
    /// Display label.
    pub label: String,
    /// Document type the dimension values link to.
    pub document_type: String,
    /// Disabled dimensions are neither filtered on nor shown.
    #[serde(default)]
    pub disabled: bool,
    /// Whether the linked document type is tree-structured.
    #[serde(default)]
    pub is_tree: bool,
}

impl AccountingDimension {
    /// Creates an enabled, flat dimension.
    #[must_use]
    pub fn new(
        fieldname: impl Into<String>,
        label: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            fieldname: fieldname.into(),
            label: label.into(),
            document_type: document_type.into(),
            disabled: false,
            is_tree: false,
        }
    }

    /// Marks the linked document type as tree-structured.
    #[must_use]
    pub const fn tree(mut self) -> Self {
        self.is_tree = true;
        self
    }

    /// True when the dimension points at finance books.
    #[must_use]
    pub fn is_finance_book(&self) -> bool {
        self.document_type == FINANCE_BOOK
    }

    /// Whether selection should filter on this dimension.
    #[must_use]
    pub fn is_filterable(&self) -> bool {
        !self.disabled && !self.is_finance_book()
    }
}
