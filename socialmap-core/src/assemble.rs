// Site record assembly: merges site metadata, auxiliary sources, tags and the
// scored link graph into one record per domain

use crate::config::TagConfig;
use crate::error::{CoreError, Result};
use crate::site::{CORE_FIELDS, SiteRecord, is_truthy, push_unique, string_list};
use chrono::DateTime;
use serde_json::{Map, Number, Value};
use socialmap_graph::progress::checkpoint;
use socialmap_graph::{ProgressCallback, ScoredGraph, Stage};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Report assembly progress every this many sites
pub const SITE_PROGRESS_INTERVAL: usize = 100;

/// Input fields that are consumed and never forwarded
const DROPPED_FIELDS: &[&str] = &["mf2", "html"];

pub struct SiteAssembler<'a> {
    tags: &'a TagConfig,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> SiteAssembler<'a> {
    pub fn new(tags: &'a TagConfig) -> Self {
        Self {
            tags,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Build the full view.
    ///
    /// Base sites come first in input order, followed by domains seen only as
    /// link sources, sorted. Auxiliary sources are applied in order with the
    /// last value of each field winning.
    pub fn assemble(
        &self,
        sites: Vec<Value>,
        graph: &ScoredGraph,
        extras: &[Vec<Value>],
    ) -> Result<Vec<SiteRecord>> {
        let mut base: Vec<(String, Map<String, Value>)> = Vec::with_capacity(sites.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, site) in sites.into_iter().enumerate() {
            let (domain, fields) = into_domain_fields("sites", index, site)?;
            if let Some(&position) = seen.get(&domain) {
                warn!("Duplicate site record for {}, keeping the last", domain);
                base[position].1 = fields;
                continue;
            }
            seen.insert(domain.clone(), base.len());
            base.push((domain, fields));
        }

        let stubs: Vec<(String, Map<String, Value>)> = graph
            .sources()
            .iter()
            .filter(|domain| !seen.contains_key(*domain))
            .map(|domain| (domain.clone(), Map::new()))
            .collect();
        debug!(
            "{} base sites, {} link-only domains",
            base.len(),
            stubs.len()
        );

        let mut all_extra = merge_extras(extras)?;

        let mut records = Vec::with_capacity(base.len() + stubs.len());
        for (domain, mut fields) in base.into_iter().chain(stubs) {
            if let Some(extra) = all_extra.remove(&domain) {
                for (key, value) in extra {
                    fields.insert(key, value);
                }
            }
            records.push(self.assemble_site(domain, fields, graph));
            checkpoint(
                self.progress_callback.as_ref(),
                Stage::Sites,
                records.len(),
                SITE_PROGRESS_INTERVAL,
            );
        }

        if !all_extra.is_empty() {
            debug!(
                "Ignored auxiliary data for {} domains outside the site list",
                all_extra.len()
            );
        }
        info!("Assembled {} site records", records.len());
        Ok(records)
    }

    /// Turn one merged field set into a [`SiteRecord`]
    pub fn assemble_site(
        &self,
        domain: String,
        mut fields: Map<String, Value>,
        graph: &ScoredGraph,
    ) -> SiteRecord {
        for field in DROPPED_FIELDS {
            fields.shift_remove(*field);
        }

        if let Some(num_pages) = fields.get_mut("num_pages") {
            coerce_integer(num_pages);
        }

        let mut tags = string_list(fields.shift_remove("tags"));
        for tag in self.tags.matching_tags(&domain) {
            push_unique(&mut tags, tag);
        }
        if fields.get("webmention_endpoints").is_some_and(is_truthy) {
            push_unique(&mut tags, "webmention");
        }
        if fields.get("micropub_endpoints").is_some_and(is_truthy) {
            push_unique(&mut tags, "micropub");
        }

        let mut servers = string_list(fields.shift_remove("servers"));
        let generators = string_list(fields.shift_remove("rel_generators"))
            .into_iter()
            .chain(string_list(fields.shift_remove("meta_generators")));
        for generator in generators {
            push_unique(&mut servers, self.tags.canonical_server(&generator));
        }
        for server in &servers {
            if self.tags.is_server_tag(server) {
                push_unique(&mut tags, server);
            }
        }

        let (crawl_start, crawl_end) = crawl_times(&mut fields);
        let hcard = parse_hcard(&domain, fields.shift_remove("hcard"));

        for field in CORE_FIELDS {
            fields.shift_remove(*field);
        }

        let totals = graph.totals(&domain);
        let links = graph.links(&domain).cloned().unwrap_or_default();

        SiteRecord {
            domain,
            extra: fields,
            tags,
            servers,
            crawl_start,
            crawl_end,
            hcard,
            links_out: totals.links_out,
            links_in: totals.links_in,
            links,
            links_truncated: None,
        }
    }
}

/// Fold auxiliary sources into one field map per domain, later sources
/// overriding earlier ones field by field
pub fn merge_extras(extras: &[Vec<Value>]) -> Result<HashMap<String, Map<String, Value>>> {
    let mut merged: HashMap<String, Map<String, Value>> = HashMap::new();
    for (source, records) in extras.iter().enumerate() {
        let source_name = format!("extra #{}", source + 1);
        for (index, record) in records.iter().enumerate() {
            let (domain, fields) = into_domain_fields(&source_name, index, record.clone())?;
            let entry = merged.entry(domain).or_default();
            for (key, value) in fields {
                entry.insert(key, value);
            }
        }
    }
    Ok(merged)
}

/// Split a JSON record into its domain and its full field map
fn into_domain_fields(
    source_name: &str,
    index: usize,
    record: Value,
) -> Result<(String, Map<String, Value>)> {
    let missing = || CoreError::MissingDomain {
        source_name: source_name.to_string(),
        index,
    };
    let Value::Object(fields) = record else {
        return Err(missing());
    };
    let domain = fields
        .get("domain")
        .and_then(Value::as_str)
        .ok_or_else(missing)?
        .to_string();
    Ok((domain, fields))
}

/// Best-effort integer coercion; values that don't parse are left as-is
fn coerce_integer(value: &mut Value) {
    if !is_truthy(value) {
        return;
    }
    let coerced = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => return,
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| Number::from(f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Number::from),
        _ => None,
    };
    if let Some(n) = coerced {
        *value = Value::Number(n);
    }
}

/// Resolve `crawl_start` / `crawl_end`, consuming `fetch_time`.
///
/// Unix timestamps become ISO-8601 UTC at second precision. Without both
/// bounds, `fetch_time` stands in for both.
fn crawl_times(fields: &mut Map<String, Value>) -> (Option<Value>, Option<Value>) {
    let fetch = fields.shift_remove("fetch_time").filter(is_truthy);
    let start = fields.shift_remove("crawl_start");
    let end = fields.shift_remove("crawl_end");

    let both = start.as_ref().filter(|v| is_truthy(v)).and_then(iso_timestamp);
    let both = both.zip(end.as_ref().filter(|v| is_truthy(v)).and_then(iso_timestamp));
    if let Some((start, end)) = both {
        return (Some(Value::String(start)), Some(Value::String(end)));
    }
    if let Some(fetch) = fetch {
        return (Some(fetch.clone()), Some(fetch));
    }
    (start, end)
}

/// Format unix seconds (number or numeric string) as `YYYY-MM-DDTHH:MM:SS`
pub fn iso_timestamp(value: &Value) -> Option<String> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Decode the hcard field. Anything unusable becomes an empty object.
fn parse_hcard(domain: &str, hcard: Option<Value>) -> Value {
    let parsed = match hcard {
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring malformed hcard for {}: {}", domain, e);
                None
            }
        },
        Some(value @ Value::Object(_)) => Some(value),
        _ => None,
    };
    parsed
        .filter(is_truthy)
        .unwrap_or_else(|| Value::Object(Map::new()))
}
