use crate::error::Result;
use crate::event::LinkEvent;
use crate::graph::LinkGraph;
use crate::progress::{ProgressCallback, Stage, checkpoint};
use serde_json::Value;
use tracing::{debug, info};

/// Report aggregation progress every this many link records
pub const LINK_PROGRESS_INTERVAL: usize = 10_000;

/// Single streaming pass over link events that builds a [`LinkGraph`]
pub struct LinkAggregator {
    graph: LinkGraph,
    processed: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Default for LinkAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkAggregator {
    pub fn new() -> Self {
        Self {
            graph: LinkGraph::new(),
            processed: 0,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn push(&mut self, event: &LinkEvent) {
        self.graph.record(event);
        self.processed += 1;
        checkpoint(
            self.progress_callback.as_ref(),
            Stage::Links,
            self.processed,
            LINK_PROGRESS_INTERVAL,
        );
    }

    /// Parse and fold one raw JSON link record. A record missing a required
    /// field aborts the pass.
    pub fn push_record(&mut self, record: Value) -> Result<()> {
        let event = LinkEvent::from_record(self.processed, record)?;
        self.push(&event);
        Ok(())
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn finish(self) -> LinkGraph {
        info!(
            "Aggregated {} link records into {} edges across {} domains",
            self.processed,
            self.graph.edge_count(),
            self.graph.edges.len()
        );
        debug!("{} distinct source domains", self.graph.sources.len());
        self.graph
    }
}

/// Aggregate already-parsed events
pub fn aggregate<'a, I>(events: I) -> LinkGraph
where
    I: IntoIterator<Item = &'a LinkEvent>,
{
    let mut aggregator = LinkAggregator::new();
    for event in events {
        aggregator.push(event);
    }
    aggregator.finish()
}

/// Aggregate raw JSON link records, failing on the first invalid one
pub fn aggregate_records<I>(records: I, progress_callback: Option<ProgressCallback>) -> Result<LinkGraph>
where
    I: IntoIterator<Item = Value>,
{
    let mut aggregator = LinkAggregator::new();
    if let Some(cb) = progress_callback {
        aggregator = aggregator.with_progress_callback(cb);
    }
    for record in records {
        aggregator.push_record(record)?;
    }
    Ok(aggregator.finish())
}
