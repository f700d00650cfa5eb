use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("link record {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("link record {index} has invalid count: {value}")]
    InvalidCount { index: usize, value: String },

    #[error("unknown mf2 class '{0}'")]
    UnknownMf2Class(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
