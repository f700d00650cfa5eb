use crate::error::{GraphError, Result};
use crate::graph::{Direction, DomainTotals, EdgeBucket, EdgeMap, LinkGraph};
use crate::progress::{ProgressCallback, Stage, checkpoint};
use indexmap::IndexMap;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Scores are computed and emitted with this many significant digits
pub const SIGNIFICANT_DIGITS: u32 = 3;

/// Report scoring progress every this many source domains
pub const SCORING_PROGRESS_INTERVAL: usize = 10_000;

/// Weight of each known mf2 class. Any other class is a data error.
pub const MF2_WEIGHTS: &[(&str, u64)] = &[
    ("in-reply-to", 5),
    ("invitee", 5),
    ("quotation-of", 3),
    ("repost-of", 3),
    ("like-of", 2),
    ("favorite-of", 2),
    ("bookmark-of", 2),
    ("other", 1),
];

pub fn mf2_weight(class: &str) -> Option<u64> {
    MF2_WEIGHTS
        .iter()
        .find(|(name, _)| *name == class)
        .map(|(_, weight)| *weight)
}

/// Fixed-precision decimal score.
///
/// Every value is rounded half-to-even to [`SIGNIFICANT_DIGITS`] when it is
/// produced, so results do not depend on platform float behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(Decimal);

impl Score {
    pub const ZERO: Score = Score(Decimal::ZERO);
    pub const ONE: Score = Score(Decimal::ONE);

    pub fn new(value: Decimal) -> Self {
        Score(round(value))
    }

    /// Exact integer term, not rounded until it is summed
    pub fn from_count(count: u64) -> Self {
        Score(Decimal::from(count))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

fn round(value: Decimal) -> Decimal {
    value
        .round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointNearestEven)
        .unwrap_or(value)
        .normalize()
}

impl Add for Score {
    type Output = Score;

    fn add(self, rhs: Score) -> Score {
        Score::new(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

/// Unnormalized weight of an edge: every class count in both directions
/// times its mf2 weight times its direction weight
pub fn raw_score(bucket: &EdgeBucket) -> Result<Score> {
    let mut score = Score::ZERO;
    for direction in [Direction::Out, Direction::In] {
        for (class, count) in bucket.counts(direction) {
            let weight =
                mf2_weight(class).ok_or_else(|| GraphError::UnknownMf2Class(class.clone()))?;
            let term = count
                .saturating_mul(weight)
                .saturating_mul(direction.weight());
            score = score + Score::from_count(term);
        }
    }
    Ok(score)
}

/// Rescale `raw` against the strongest edge `max` of the same domain.
///
/// Edges with a raw score of 1 or less are zeroed; otherwise the score is
/// `ln(raw) / ln(max)`, so the strongest edges land on 1.
pub fn normalize(raw: Score, max: Score) -> Score {
    if raw.0 <= Decimal::ONE {
        return Score::ZERO;
    }
    let (Some(raw_ln), Some(max_ln)) = (raw.0.checked_ln(), max.0.checked_ln()) else {
        return Score::ZERO;
    };
    if max_ln.is_zero() {
        return Score::ONE;
    }
    match raw_ln.checked_div(max_ln) {
        Some(ratio) => Score::new(ratio.clamp(Decimal::ZERO, Decimal::ONE)),
        None => Score::ZERO,
    }
}

/// Score one domain's edges in place and order them strongest first.
///
/// The sort is stable, so equal scores keep the first-seen order the
/// aggregation pass recorded.
pub fn score_domain(edges: &mut EdgeMap) -> Result<()> {
    let mut raw = Vec::with_capacity(edges.len());
    let mut max = Score::ZERO;
    for bucket in edges.values() {
        let score = raw_score(bucket)?;
        if score > max {
            max = score;
        }
        raw.push(score);
    }

    for (bucket, score) in edges.values_mut().zip(raw) {
        bucket.score = normalize(score, max);
    }
    edges.sort_by(|_, a, _, b| b.score.cmp(&a.score));
    Ok(())
}

/// Read-only graph whose edges carry normalized scores
#[derive(Debug, Clone, Default)]
pub struct ScoredGraph {
    links: IndexMap<String, EdgeMap>,
    sources: BTreeSet<String>,
    totals: HashMap<String, DomainTotals>,
}

impl ScoredGraph {
    /// A domain's edges, strongest first
    pub fn links(&self, domain: &str) -> Option<&EdgeMap> {
        self.links.get(domain)
    }

    pub fn totals(&self, domain: &str) -> DomainTotals {
        self.totals.get(domain).copied().unwrap_or_default()
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Turns an aggregated [`LinkGraph`] into a [`ScoredGraph`]
#[derive(Default)]
pub struct ScoreComputer {
    progress_callback: Option<ProgressCallback>,
}

impl ScoreComputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Score every domain. Domains are independent, so they are scored in
    /// parallel; each domain's tie order lives in its own edge map.
    pub fn score(&self, graph: LinkGraph) -> Result<ScoredGraph> {
        let LinkGraph {
            mut edges,
            sources,
            totals,
        } = graph;

        let processed = AtomicUsize::new(0);
        edges.par_values_mut().try_for_each(|targets| {
            score_domain(targets)?;
            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            checkpoint(
                self.progress_callback.as_ref(),
                Stage::Scoring,
                done,
                SCORING_PROGRESS_INTERVAL,
            );
            Ok::<(), GraphError>(())
        })?;

        info!("Scored edges for {} domains", edges.len());
        Ok(ScoredGraph {
            links: edges,
            sources,
            totals,
        })
    }
}
