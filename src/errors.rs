use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid input: {0}")] Validation(String),
    #[error("tone analysis failed: {0}")] Analysis(String),
    #[error("post generation failed: {0}")] Generation(String),
    #[error("model reply is not valid JSON: {0}")] Format(String),
    #[error("{0}")] Shape(#[from] ShapeError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("result is not a list of posts")]
    NotAList,
    #[error("post #{index} is malformed: {reason}")]
    Entry { index: usize, reason: String },
    #[error("expected {expected} posts, got {found}")]
    Count { expected: usize, found: usize },
}
