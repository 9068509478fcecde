use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::pipeline::nlp::ResourceType;

/// Value of one search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchValue {
    Single(String),
    Multiple(Vec<String>),
}

impl SearchValue {
    /// All values, in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            SearchValue::Single(v) => vec![v.as_str()],
            SearchValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::Single(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::Single(value)
    }
}

impl From<Vec<String>> for SearchValue {
    fn from(values: Vec<String>) -> Self {
        SearchValue::Multiple(values)
    }
}

/// Search parameters in insertion order. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    entries: Vec<(String, SearchValue)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter. An existing key keeps its position.
    pub fn set(&mut self, key: &str, value: impl Into<SearchValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SearchValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SearchValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for SearchParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMode {
    Count,
}

/// A FHIR search, ready to render or hand to a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub resource_type: ResourceType,
    pub search_params: SearchParams,
    pub include: Vec<String>,
    pub sort: Vec<String>,
    pub count: u32,
    pub summary: Option<SummaryMode>,
}
