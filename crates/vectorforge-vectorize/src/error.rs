use thiserror::Error;
use vectorforge_embedding::EmbeddingError;
use vectorforge_scheduler::{ErrorKind, SchedulerError};

#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("columns not found in table: {missing:?}. available columns: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl SchedulerError for VectorizeError {
    fn kind(&self) -> ErrorKind {
        match self {
            VectorizeError::MissingColumns { .. } => ErrorKind::Config,
            VectorizeError::Embedding(e) => e.kind(),
        }
    }

    fn is_throttling(&self) -> bool {
        match self {
            VectorizeError::MissingColumns { .. } => false,
            VectorizeError::Embedding(e) => e.is_throttling(),
        }
    }
}
