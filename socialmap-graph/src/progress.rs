use std::fmt;
use std::sync::Arc;

/// Pipeline checkpoint reported to a [`ProgressCallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Links,
    Scoring,
    Sites,
    Base,
    Internal,
    Writing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Links => "links",
            Stage::Scoring => "scoring",
            Stage::Sites => "sites",
            Stage::Base => "base",
            Stage::Internal => "internal",
            Stage::Writing => "writing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback for reporting how many items a stage has processed so far
pub type ProgressCallback = Arc<dyn Fn(Stage, usize) + Send + Sync>;

/// Invoke `callback` when `processed` lands on a multiple of `interval`
pub fn checkpoint(
    callback: Option<&ProgressCallback>,
    stage: Stage,
    processed: usize,
    interval: usize,
) {
    if let Some(cb) = callback
        && processed > 0
        && processed % interval == 0
    {
        cb(stage, processed);
    }
}
