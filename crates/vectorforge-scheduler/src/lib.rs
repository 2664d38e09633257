//! A generic, bounded-concurrency scheduler: drive a queue of work items
//! through a user-supplied async operation, retrying per-item failures and
//! preserving input order in the output.

pub mod backoff;
pub mod config;
pub mod error;
pub mod events;
mod scheduler;

pub use backoff::RetryStrategy;
pub use config::{ProcessorConfig, ProcessorConfigBuilder};
pub use error::{ErrorKind, SchedulerError};
pub use events::SchedulerEvent;
pub use scheduler::{process, ProcessorResult, WorkItem};
