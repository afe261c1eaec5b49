use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Failed to read PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("{0} is empty")]
    EmptyText(&'static str),

    #[error("Embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}
