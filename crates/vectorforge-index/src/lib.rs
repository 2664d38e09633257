//! Batches documents, submits bulk-index requests via the batch scheduler,
//! and triages per-item errors against the search cluster's bulk response
//! shape.

mod error;
mod indexer;
mod schema;
mod search_client;

pub use error::{BulkBatchError, IndexError};
pub use indexer::{ingest, BulkBatchItem, BATCH_SIZE, NUM_WORKERS};
pub use schema::{
    IndexSchema, VectorField, VectorFieldMethod, VectorFieldMethodParameters,
    VectorSearchEngine, VectorSearchMethodName, VectorSearchSpaceType,
};
pub use search_client::SearchClusterClient;
