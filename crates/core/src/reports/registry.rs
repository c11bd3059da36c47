//! Named report engines.
//!
//! Reports register under their display name ("General Ledger") and are
//! resolved either by that name or by its slug ("general-ledger"), so HTTP
//! paths and UI labels address the same engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::error::ReportError;
use super::types::ReportOutput;

/// A report that turns a filter document into columns and rows.
pub trait ReportEngine: Send + Sync {
    /// Display name the report registers under.
    fn name(&self) -> &'static str;

    /// Runs the report.
    fn execute(&self, filters: &serde_json::Value) -> Result<ReportOutput, ReportError>;
}

/// Lower-cased, hyphen-separated form of a report name.
#[must_use]
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Report engines keyed by slug.
#[derive(Default, Clone)]
pub struct ReportRegistry {
    engines: BTreeMap<String, Arc<dyn ReportEngine>>,
}

impl ReportRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an engine, replacing any engine with the same name.
    pub fn register(&mut self, engine: Arc<dyn ReportEngine>) -> &mut Self {
        let key = slug(engine.name());
        debug!(report = engine.name(), %key, "registering report");
        self.engines.insert(key, engine);
        self
    }

    /// Looks up an engine by display name or slug.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ReportEngine>> {
        self.engines.get(&slug(name)).cloned()
    }

    /// Registered display names, ordered by slug.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.engines.values().map(|engine| engine.name()).collect()
    }

    /// Runs the named report.
    pub fn execute(
        &self,
        name: &str,
        filters: &serde_json::Value,
    ) -> Result<ReportOutput, ReportError> {
        let engine = self
            .get(name)
            .ok_or_else(|| ReportError::UnknownReport(name.to_string()))?;
        engine.execute(filters)
    }

    /// Number of registered reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether no report is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl std::fmt::Debug for ReportRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportRegistry")
            .field("reports", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ReportEngine for Echo {
        fn name(&self) -> &'static str {
            "Echo Report"
        }

        fn execute(&self, _filters: &serde_json::Value) -> Result<ReportOutput, ReportError> {
            Ok(ReportOutput::default())
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("General Ledger"), "general-ledger");
        assert_eq!(slug("general-ledger"), "general-ledger");
    }

    #[test]
    fn test_resolves_by_name_or_slug() {
        let mut registry = ReportRegistry::new();
        registry.register(Arc::new(Echo));

        assert!(registry.get("Echo Report").is_some());
        assert!(registry.get("echo-report").is_some());
        assert_eq!(registry.names(), vec!["Echo Report"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_report() {
        let registry = ReportRegistry::new();
        let err = registry
            .execute("Trial Balance", &serde_json::Value::Null)
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownReport(name) if name == "Trial Balance"));
    }
}
