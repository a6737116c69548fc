//! Query identity
//!
//! A `QueryKey` names one logical, shareable page cache: the resource kind
//! plus the filter parameters sent with every page request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single filter parameter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
}

impl FilterValue {
    /// Render as a query-string value
    pub fn as_param(&self) -> String {
        match self {
            FilterValue::Text(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<String> for FilterValue {
    fn from(val: String) -> Self {
        FilterValue::Text(val)
    }
}

impl From<&str> for FilterValue {
    fn from(val: &str) -> Self {
        FilterValue::Text(val.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(val: i64) -> Self {
        FilterValue::Integer(val)
    }
}

impl From<i32> for FilterValue {
    fn from(val: i32) -> Self {
        FilterValue::Integer(i64::from(val))
    }
}

impl From<u32> for FilterValue {
    fn from(val: u32) -> Self {
        FilterValue::Integer(i64::from(val))
    }
}

impl From<bool> for FilterValue {
    fn from(val: bool) -> Self {
        FilterValue::Bool(val)
    }
}

/// Composite identity `{resource kind, filter parameters}` of one page cache
///
/// Filters are kept sorted by name, so two keys built with the same
/// filters in a different order are equal and hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey {
    resource: String,
    filters: BTreeMap<String, FilterValue>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filters: BTreeMap::new(),
        }
    }

    /// Add or replace a filter parameter
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterValue> {
        &self.filters
    }

    pub fn filter(&self, name: &str) -> Option<&FilterValue> {
        self.filters.get(name)
    }

    /// Filters as `(name, value)` query parameters, in name order
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(name, value)| (name.clone(), value.as_param()))
            .collect()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (i, (name, value)) in self.filters.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value.as_param())?;
        }
        Ok(())
    }
}
