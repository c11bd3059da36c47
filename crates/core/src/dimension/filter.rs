//! Dimensional filtering for reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Requested values per accounting dimension, keyed by fieldname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    /// Filter by specific dimension values.
    pub values: BTreeMap<String, Vec<String>>,
}

impl DimensionFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets every requested value of a dimension at once. Empty lists are dropped.
    pub fn set(&mut self, fieldname: impl Into<String>, values: Vec<String>) {
        let fieldname = fieldname.into();
        if values.is_empty() {
            self.values.remove(&fieldname);
        } else {
            self.values.insert(fieldname, values);
        }
    }

    /// Requested values of a dimension, `None` when unfiltered.
    #[must_use]
    pub fn get(&self, fieldname: &str) -> Option<&[String]> {
        self.values.get(fieldname).map(Vec::as_slice)
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = DimensionFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.get("branch"), None);
    }

    #[test]
    fn test_values_are_kept_per_dimension() {
        let mut filter = DimensionFilter::new();
        filter.set("branch", vec!["North".to_string(), "South".to_string()]);
        filter.set("region", vec!["EU".to_string()]);

        assert_eq!(
            filter.get("branch"),
            Some(["North".to_string(), "South".to_string()].as_slice())
        );
        assert_eq!(filter.get("region").map(<[String]>::len), Some(1));
    }

    #[test]
    fn test_set_drops_empty_lists() {
        let mut filter = DimensionFilter::new();
        filter.set("branch", vec!["North".to_string()]);
        filter.set("branch", Vec::new());
        assert!(filter.is_empty());
    }
}
