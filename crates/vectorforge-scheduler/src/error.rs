//! The error-kind taxonomy a scheduler op's failures are classified into.

use std::fmt;

/// Coarse classification of a per-item failure, used to decide retryability.
///
/// `ServiceClient` is the default retryable kind (network/transport/5xx-style
/// failures from a downstream service); `Custom` lets callers extend the
/// taxonomy without the scheduler knowing about their domain's error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network, transport, or service-side failure. Retried by default.
    ServiceClient,
    /// Invalid user input. Never retried.
    Config,
    /// A well-formed but unparsable response. Not retried by default.
    OutputParse,
    /// Any error outside `retryable_kinds`. Never retried.
    Permanent,
    /// An application-defined kind outside the built-in taxonomy.
    Custom(&'static str),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ServiceClient => write!(f, "service-client"),
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::OutputParse => write!(f, "output-parse"),
            ErrorKind::Permanent => write!(f, "permanent"),
            ErrorKind::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// An error a scheduler op can fail with. Implementors classify themselves
/// so the scheduler can decide retryability without knowing the concrete
/// error type.
pub trait SchedulerError: std::error::Error + Send + Sync + 'static {
    /// The taxonomy bucket this error belongs to.
    fn kind(&self) -> ErrorKind;

    /// Whether this error represents an upstream throttling signal. Feeds
    /// `handle_throttling`; the default implementation reports no
    /// throttling, since most error kinds never carry this signal.
    fn is_throttling(&self) -> bool {
        false
    }
}
