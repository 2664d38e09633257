//! A connection-pooled client over a remote embedding API, with one
//! [`vectorforge_gate::AdaptiveGate`] per client mediating admission control,
//! and per-model request/response adapters.

pub mod adapter;
pub mod client;
pub mod error;
pub mod types;

pub use adapter::{CohereAdapter, ModelAdapter, TitanAdapter};
pub use client::EmbeddingClient;
pub use error::EmbeddingError;
pub use types::{
    AdapterFamily, EmbeddingModelId, EmbeddingModelOutput, EmbeddingType, InputType, Vector,
};

pub use vectorforge_gate::GateConfig;
