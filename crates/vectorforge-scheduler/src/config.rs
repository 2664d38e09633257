use std::collections::HashSet;
use std::sync::Arc;

use vectorforge_core::EventListeners;

use crate::backoff::RetryStrategy;
use crate::error::{ErrorKind, SchedulerError};
use crate::events::SchedulerEvent;

/// Immutable configuration for one scheduler run.
pub struct ProcessorConfig<E> {
    pub(crate) max_attempts: usize,
    pub(crate) num_workers: usize,
    pub(crate) retry_strategy: RetryStrategy,
    pub(crate) handle_throttling: bool,
    pub(crate) on_progress: Option<Arc<dyn Fn(u64) + Send + Sync>>,
    pub(crate) retryable_kinds: HashSet<ErrorKind>,
    pub(crate) is_throttling: Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<SchedulerEvent>,
}

impl<E> ProcessorConfig<E>
where
    E: SchedulerError,
{
    pub fn builder() -> ProcessorConfigBuilder<E> {
        ProcessorConfigBuilder::default()
    }

    pub(crate) fn is_retryable(&self, error: &E) -> bool {
        self.retryable_kinds.contains(&error.kind())
    }

    pub(crate) fn classify_throttling(&self, error: &E) -> bool {
        match &self.is_throttling {
            Some(predicate) => predicate(error),
            None => error.is_throttling(),
        }
    }
}

/// Builder for [`ProcessorConfig`].
pub struct ProcessorConfigBuilder<E> {
    max_attempts: usize,
    num_workers: usize,
    retry_strategy: RetryStrategy,
    handle_throttling: bool,
    on_progress: Option<Arc<dyn Fn(u64) + Send + Sync>>,
    retryable_kinds: HashSet<ErrorKind>,
    is_throttling: Option<Arc<dyn Fn(&E) -> bool + Send + Sync>>,
    name: String,
    event_listeners: EventListeners<SchedulerEvent>,
}

impl<E> Default for ProcessorConfigBuilder<E> {
    fn default() -> Self {
        let mut retryable_kinds = HashSet::new();
        retryable_kinds.insert(ErrorKind::ServiceClient);
        Self {
            max_attempts: 10,
            num_workers: 100,
            retry_strategy: RetryStrategy::Jittered,
            handle_throttling: true,
            on_progress: None,
            retryable_kinds,
            is_throttling: None,
            name: "<unnamed>".to_string(),
            event_listeners: EventListeners::new(),
        }
    }
}

impl<E> ProcessorConfigBuilder<E>
where
    E: SchedulerError,
{
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn retry_strategy(mut self, retry_strategy: RetryStrategy) -> Self {
        self.retry_strategy = retry_strategy;
        self
    }

    pub fn handle_throttling(mut self, handle_throttling: bool) -> Self {
        self.handle_throttling = handle_throttling;
        self
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(f));
        self
    }

    /// Replaces the default retryable-kind set (`{ServiceClient}`).
    pub fn retryable_kinds(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_kinds = kinds.into_iter().collect();
        self
    }

    pub fn is_throttling<F>(mut self, f: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.is_throttling = Some(Arc::new(f));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&SchedulerEvent) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(vectorforge_core::FnListener::new(move |event: &SchedulerEvent| {
                if matches!(event, SchedulerEvent::Retry { .. }) {
                    f(event);
                }
            }));
        self
    }

    pub fn build(self) -> ProcessorConfig<E> {
        ProcessorConfig {
            max_attempts: self.max_attempts,
            num_workers: self.num_workers,
            retry_strategy: self.retry_strategy,
            handle_throttling: self.handle_throttling,
            on_progress: self.on_progress,
            retryable_kinds: self.retryable_kinds,
            is_throttling: self.is_throttling,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}
