//! Parsed metrics of one invocation or one work item

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metric name to value mapping
///
/// Values stay as JSON values: free-text metrics are kept as the strings the
/// program printed, while structured output keeps whatever types it decoded
/// to. Keys iterate in sorted order so serialized reports are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedMetrics(BTreeMap<String, Value>);

impl ParsedMetrics {
    /// Empty metrics
    pub fn new() -> Self {
        ParsedMetrics(BTreeMap::new())
    }

    /// Insert or replace a metric
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a metric
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Check if a metric is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of metrics
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate metrics in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `other` into `self`, optionally prefixing every key with
    /// `"<prefix>."`
    pub fn merge(&mut self, other: ParsedMetrics, prefix: Option<&str>) {
        for (key, value) in other.0 {
            let key = match prefix {
                Some(p) => format!("{}.{}", p, key),
                None => key,
            };
            self.0.insert(key, value);
        }
    }

    /// Render a metric for tabular output: strings verbatim, other values as
    /// compact JSON
    pub fn display_value(&self, name: &str) -> Option<String> {
        self.0.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Convert into a JSON object
    pub fn into_json(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl From<serde_json::Map<String, Value>> for ParsedMetrics {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        ParsedMetrics(map.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for ParsedMetrics {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        ParsedMetrics(iter.into_iter().collect())
    }
}
