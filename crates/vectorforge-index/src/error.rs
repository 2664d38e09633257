use std::collections::HashMap;

use thiserror::Error;
use vectorforge_scheduler::{ErrorKind, SchedulerError};

/// A batch-level bulk-index failure: one or more documents in the batch
/// returned a non-ignorable error. Carries the accumulated per-error-kind
/// counts so the cause is visible without re-parsing the bulk response.
#[derive(Debug, Error)]
#[error("bulk batch failed: {0:?}")]
pub struct BulkBatchError(pub HashMap<String, usize>);

impl SchedulerError for BulkBatchError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ServiceClient
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Batch(#[from] BulkBatchError),
}

impl SchedulerError for IndexError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ServiceClient
    }
}
