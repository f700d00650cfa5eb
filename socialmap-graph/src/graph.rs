use crate::event::LinkEvent;
use crate::score::Score;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// mf2 class name -> accumulated link count, in first-seen order
pub type ClassCounts = IndexMap<String, u64>;

/// Target domain -> edge, in first-seen order until scoring reorders it
pub type EdgeMap = IndexMap<String, EdgeBucket>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Out => "out",
            Direction::In => "in",
        }
    }

    /// Links a site makes count for more than links it receives
    pub fn weight(&self) -> u64 {
        match self {
            Direction::Out => 2,
            Direction::In => 1,
        }
    }
}

/// Aggregated relationship between a source domain and one target domain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeBucket {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub out: ClassCounts,
    #[serde(rename = "in", skip_serializing_if = "IndexMap::is_empty")]
    pub incoming: ClassCounts,
    pub score: Score,
}

impl EdgeBucket {
    pub fn counts(&self, direction: Direction) -> &ClassCounts {
        match direction {
            Direction::Out => &self.out,
            Direction::In => &self.incoming,
        }
    }

    pub fn add(&mut self, direction: Direction, mf2_class: &str, count: u64) {
        let counts = match direction {
            Direction::Out => &mut self.out,
            Direction::In => &mut self.incoming,
        };
        *counts.entry(mf2_class.to_string()).or_insert(0) += count;
    }

    pub fn total(&self, direction: Direction) -> u64 {
        self.counts(direction).values().sum()
    }
}

/// Per-domain degree totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainTotals {
    pub links_out: u64,
    pub links_in: u64,
}

/// Weighted directed multigraph of domains built from link events.
///
/// Every event `from -> to` lands twice: as an `out` count on the edge
/// `from -> to` and as an `in` count on the edge `to -> from`, so each
/// domain's edge map sees both directions of its relationships.
///
/// Memory grows with the number of distinct domain pairs observed; the whole
/// graph is held in memory and nothing is spilled to disk.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pub(crate) edges: IndexMap<String, EdgeMap>,
    pub(crate) sources: BTreeSet<String>,
    pub(crate) totals: HashMap<String, DomainTotals>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the edge `from -> to`, creating an empty one if needed
    pub fn edge_mut(&mut self, from: &str, to: &str) -> &mut EdgeBucket {
        self.edges
            .entry(from.to_string())
            .or_default()
            .entry(to.to_string())
            .or_default()
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&EdgeBucket> {
        self.edges.get(from).and_then(|targets| targets.get(to))
    }

    pub fn edges_from(&self, domain: &str) -> Option<&EdgeMap> {
        self.edges.get(domain)
    }

    /// Fold one event into the graph and the degree totals
    pub fn record(&mut self, event: &LinkEvent) {
        let LinkEvent {
            from_domain,
            to_domain,
            count,
            mf2_class,
        } = event;

        self.sources.insert(from_domain.clone());
        self.edge_mut(from_domain, to_domain)
            .add(Direction::Out, mf2_class, *count);
        self.edge_mut(to_domain, from_domain)
            .add(Direction::In, mf2_class, *count);

        self.totals.entry(from_domain.clone()).or_default().links_out += count;
        self.totals.entry(to_domain.clone()).or_default().links_in += count;
    }

    /// Domains that appeared as `from_domain` in at least one event
    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn totals(&self, domain: &str) -> DomainTotals {
        self.totals.get(domain).copied().unwrap_or_default()
    }

    /// Every domain with at least one edge, in first-seen order
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Number of directed domain pairs held
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
