pub mod aggregate;
pub mod error;
pub mod event;
pub mod graph;
pub mod progress;
pub mod score;

pub use aggregate::{LinkAggregator, aggregate, aggregate_records};
pub use error::GraphError;
pub use event::LinkEvent;
pub use graph::{ClassCounts, Direction, DomainTotals, EdgeBucket, EdgeMap, LinkGraph};
pub use progress::{ProgressCallback, Stage};
pub use score::{Score, ScoreComputer, ScoredGraph};
