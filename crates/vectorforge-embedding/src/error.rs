use thiserror::Error;
use vectorforge_scheduler::{ErrorKind, SchedulerError};

/// Errors surfaced by [`crate::EmbeddingClient`] and its model adapters.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Invalid caller input: unsupported model id, or a requested dimension
    /// outside the adapter's allow-list. Never retried.
    #[error("config error: {0}")]
    Config(String),

    /// Network, transport, or service-side 5xx failure.
    #[error("transient service error: {0}")]
    TransientService(String),

    /// The service reported `ThrottlingException`.
    #[error("throttled by embedding service")]
    Throttling,

    /// The service returned a well-formed response that doesn't match the
    /// expected schema for the chosen model.
    #[error("could not parse model output: {preview}")]
    OutputParse { preview: String },
}

impl EmbeddingError {
    /// Truncates `body` to the 200-char preview carried by
    /// [`EmbeddingError::OutputParse`].
    pub fn output_parse(body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::OutputParse { preview }
    }
}

impl SchedulerError for EmbeddingError {
    fn kind(&self) -> ErrorKind {
        match self {
            EmbeddingError::Config(_) => ErrorKind::Config,
            EmbeddingError::TransientService(_) | EmbeddingError::Throttling => {
                ErrorKind::ServiceClient
            }
            EmbeddingError::OutputParse { .. } => ErrorKind::OutputParse,
        }
    }

    fn is_throttling(&self) -> bool {
        matches!(self, EmbeddingError::Throttling)
    }
}
