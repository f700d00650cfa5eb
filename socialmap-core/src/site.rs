use serde::Serialize;
use serde_json::{Map, Value};
use socialmap_graph::EdgeMap;

/// Fields owned by [`SiteRecord`] itself; everything else rides in `extra`
pub const CORE_FIELDS: &[&str] = &[
    "domain",
    "tags",
    "servers",
    "crawl_start",
    "crawl_end",
    "hcard",
    "links_out",
    "links_in",
    "links",
    "links_truncated",
];

/// Canonical per-domain output record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRecord {
    pub domain: String,
    /// Input fields passed through untouched, in input order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_start: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_end: Option<Value>,
    pub hcard: Value,
    pub links_out: u64,
    pub links_in: u64,
    pub links: EdgeMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links_truncated: Option<bool>,
}

impl SiteRecord {
    /// Record for a domain known only from link data
    pub fn stub(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            extra: Map::new(),
            tags: Vec::new(),
            servers: Vec::new(),
            crawl_start: None,
            crawl_end: None,
            hcard: Value::Object(Map::new()),
            links_out: 0,
            links_in: 0,
            links: EdgeMap::new(),
            links_truncated: None,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.links_truncated == Some(true)
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Append `item` unless it is already present
pub(crate) fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

/// JSON truthiness: null, false, zero and empty containers are false
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Strings from a JSON array, or a lone string, ignoring anything else
pub(crate) fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s],
        _ => Vec::new(),
    }
}
