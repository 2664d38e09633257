//! # vectorforge
//!
//! The concurrency and resilience core of a batch pipeline that generates
//! vector embeddings from tabular records and indexes the results into a
//! search cluster.
//!
//! Two primitives sit at the center of this crate:
//!
//! - [`vectorforge_gate::AdaptiveGate`] — an AIMD-tuned admission-control
//!   gate. Capacity contracts on throttling and expands slowly on sustained
//!   success, so a client self-tunes to whatever load class, region, or
//!   model it happens to be talking to.
//! - [`vectorforge_scheduler::process`] — a bounded-worker batch scheduler:
//!   feed it items and an async operation, get back an order-preserving
//!   result sequence with per-item retry policy applied.
//!
//! [`embedding`], [`vectorize`], and [`index`] build on those two to
//! implement the two downstream workflows that depend on the scheduler's
//! exact contract: generating embeddings for tabular columns, and bulk
//! indexing documents into a search cluster.
//!
//! Enable feature flags to pull in the pieces you need; `embedding`,
//! `vectorize`, `index`, and `progress` are on by default.

pub use vectorforge_core as core;
pub use vectorforge_gate as gate;
pub use vectorforge_scheduler as scheduler;

#[cfg(feature = "embedding")]
pub use vectorforge_embedding as embedding;

#[cfg(feature = "vectorize")]
pub use vectorforge_vectorize as vectorize;

#[cfg(feature = "index")]
pub use vectorforge_index as index;

#[cfg(feature = "progress")]
pub use vectorforge_progress as progress;

pub use vectorforge_core::{AsyncCounter, EventListener, EventListeners, FnListener, ResilienceEvent};
pub use vectorforge_gate::{AdaptiveGate, GateConfig, GateConfigError, GateGuard, LogLevel};
pub use vectorforge_scheduler::{
    process, ErrorKind, ProcessorConfig, ProcessorConfigBuilder, ProcessorResult, RetryStrategy,
    SchedulerError, SchedulerEvent, WorkItem,
};
