//! The bounded-worker batch scheduler itself.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::task::JoinSet;

use crate::backoff::{self, RetryStrategy};
use crate::config::ProcessorConfig;
use crate::error::SchedulerError;
use crate::events::SchedulerEvent;

/// A queued unit of work: its original position, its payload, and how many
/// attempts remain before it is terminally failed.
#[derive(Debug, Clone)]
pub struct WorkItem<T> {
    pub index: usize,
    pub data: T,
    pub remaining_attempts: usize,
}

/// The scheduler's terminal output: a results sequence aligned 1:1 with the
/// input order, plus aggregate counters.
#[derive(Debug)]
pub struct ProcessorResult<U, E> {
    pub results: Vec<Result<U, E>>,
    pub total_processed: usize,
    pub total_failed: usize,
    pub total_retried: usize,
}

/// Drives `items` through `op` with bounded worker concurrency, retrying
/// per-item failures according to `config`. Never fails itself: per-item
/// failures are values in the returned `results`, never a propagated error.
pub async fn process<T, U, E, F, Fut>(
    items: Vec<T>,
    op: F,
    config: ProcessorConfig<E>,
) -> ProcessorResult<U, E>
where
    T: Clone + Send + 'static,
    U: Send + 'static,
    E: SchedulerError,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<U, E>> + Send + 'static,
{
    let n = items.len();
    if n == 0 {
        return ProcessorResult {
            results: Vec::new(),
            total_processed: 0,
            total_failed: 0,
            total_retried: 0,
        };
    }

    let queue: Arc<Mutex<VecDeque<WorkItem<T>>>> = Arc::new(Mutex::new(
        items
            .into_iter()
            .enumerate()
            .map(|(index, data)| WorkItem {
                index,
                data,
                remaining_attempts: config.max_attempts,
            })
            .collect(),
    ));
    let results: Arc<Mutex<Vec<Option<Result<U, E>>>>> =
        Arc::new(Mutex::new((0..n).map(|_| None).collect()));
    let total_retried = Arc::new(AtomicUsize::new(0));
    let total_failed = Arc::new(AtomicUsize::new(0));
    let op = Arc::new(op);
    let config = Arc::new(config);

    let mut workers = JoinSet::new();
    for _ in 0..config.num_workers {
        let queue = Arc::clone(&queue);
        let results = Arc::clone(&results);
        let op = Arc::clone(&op);
        let config = Arc::clone(&config);
        let total_retried = Arc::clone(&total_retried);
        let total_failed = Arc::clone(&total_failed);
        workers.spawn(async move {
            run_worker(queue, results, op, config, total_retried, total_failed).await;
        });
    }
    while workers.join_next().await.is_some() {}

    let results: Vec<Result<U, E>> = Arc::try_unwrap(results)
        .expect("all workers finished")
        .into_inner()
        .expect("results mutex not poisoned")
        .into_iter()
        .map(|slot| slot.expect("every slot written by scheduler completion"))
        .collect();

    let total_failed = total_failed.load(Ordering::SeqCst);
    ProcessorResult {
        results,
        total_processed: n - total_failed,
        total_failed,
        total_retried: total_retried.load(Ordering::SeqCst),
    }
}

async fn run_worker<T, U, E, F, Fut>(
    queue: Arc<Mutex<VecDeque<WorkItem<T>>>>,
    results: Arc<Mutex<Vec<Option<Result<U, E>>>>>,
    op: Arc<F>,
    config: Arc<ProcessorConfig<E>>,
    total_retried: Arc<AtomicUsize>,
    total_failed: Arc<AtomicUsize>,
) where
    T: Clone + Send + 'static,
    U: Send + 'static,
    E: SchedulerError,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<U, E>> + Send + 'static,
{
    loop {
        let item = {
            let mut queue = queue.lock().expect("queue mutex poisoned");
            queue.pop_front()
        };
        let Some(mut item) = item else {
            break;
        };

        match op(item.data.clone()).await {
            Ok(value) => {
                results.lock().expect("results mutex poisoned")[item.index] = Some(Ok(value));
                run_progress_callback(&config);
                config.event_listeners.emit(&SchedulerEvent::Success {
                    pattern_name: config.name.clone(),
                    timestamp: Instant::now(),
                    index: item.index,
                });
            }
            Err(error) => {
                if !config.is_retryable(&error) {
                    fail_item(&results, &config, &total_failed, item.index, error);
                    continue;
                }

                let throttled = config.classify_throttling(&error);
                let should_retry = if config.retry_strategy == RetryStrategy::None {
                    false
                } else if throttled {
                    config.handle_throttling && item.remaining_attempts > 1
                } else {
                    item.remaining_attempts > 1
                };

                if should_retry {
                    let delay =
                        backoff::backoff(config.retry_strategy, item.remaining_attempts, config.max_attempts);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    item.remaining_attempts -= 1;
                    total_retried.fetch_add(1, Ordering::SeqCst);
                    config.event_listeners.emit(&SchedulerEvent::Retry {
                        pattern_name: config.name.clone(),
                        timestamp: Instant::now(),
                        index: item.index,
                        remaining_attempts: item.remaining_attempts,
                    });
                    queue.lock().expect("queue mutex poisoned").push_back(item);
                } else {
                    fail_item(&results, &config, &total_failed, item.index, error);
                }
            }
        }
    }
}

fn fail_item<U, E: SchedulerError>(
    results: &Mutex<Vec<Option<Result<U, E>>>>,
    config: &ProcessorConfig<E>,
    total_failed: &AtomicUsize,
    index: usize,
    error: E,
) {
    results.lock().expect("results mutex poisoned")[index] = Some(Err(error));
    total_failed.fetch_add(1, Ordering::SeqCst);
    config.event_listeners.emit(&SchedulerEvent::Failure {
        pattern_name: config.name.clone(),
        timestamp: Instant::now(),
        index,
    });
}

/// Progress callback exceptions must not affect results: this is an
/// intentional design decision, not an omission.
fn run_progress_callback<E>(config: &ProcessorConfig<E>) {
    let Some(on_progress) = &config.on_progress else {
        return;
    };
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| on_progress(1)));
    if outcome.is_err() {
        #[cfg(feature = "tracing")]
        tracing::warn!(pattern = %config.name, "on_progress callback panicked; ignoring");
        config
            .event_listeners
            .emit(&SchedulerEvent::ProgressCallbackPanicked {
                pattern_name: config.name.clone(),
                timestamp: Instant::now(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::AtomicU64;
    use thiserror::Error;

    #[derive(Debug, Error, Clone)]
    enum TestError {
        #[error("throttled")]
        Throttling,
        #[error("value error")]
        ValueError,
    }

    impl SchedulerError for TestError {
        fn kind(&self) -> ErrorKind {
            match self {
                TestError::Throttling => ErrorKind::ServiceClient,
                TestError::ValueError => ErrorKind::Permanent,
            }
        }

        fn is_throttling(&self) -> bool {
            matches!(self, TestError::Throttling)
        }
    }

    #[tokio::test]
    async fn scenario_1_doubling_succeeds_with_no_retries() {
        let items = vec![1, 2, 3, 4, 5];
        let config: ProcessorConfig<TestError> =
            ProcessorConfig::builder().num_workers(2).build();
        let result = process(items, |x: i32| async move { Ok::<_, TestError>(x * 2) }, config).await;
        let values: Vec<i32> = result.results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![2, 4, 6, 8, 10]);
        assert_eq!(result.total_retried, 0);
        assert_eq!(result.total_failed, 0);
    }

    #[tokio::test]
    async fn scenario_2_throttling_exhausts_attempts() {
        let items = vec![1, 2];
        let config: ProcessorConfig<TestError> = ProcessorConfig::builder()
            .max_attempts(2)
            .handle_throttling(true)
            .build();
        let result = process(
            items,
            |_: i32| async move { Err::<i32, _>(TestError::Throttling) },
            config,
        )
        .await;
        assert_eq!(result.total_failed, 2);
        assert_eq!(result.total_retried, 2);
        assert!(result
            .results
            .iter()
            .all(|r| matches!(r, Err(TestError::Throttling))));
    }

    #[tokio::test]
    async fn scenario_3_succeeds_on_second_attempt() {
        let attempts = Arc::new(AtomicU64::new(0));
        let config: ProcessorConfig<TestError> =
            ProcessorConfig::builder().max_attempts(3).build();
        let attempts_clone = Arc::clone(&attempts);
        let result = process(
            vec![1],
            move |_: i32| {
                let attempts = Arc::clone(&attempts_clone);
                async move {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(TestError::Throttling)
                    } else {
                        Ok(2)
                    }
                }
            },
            config,
        )
        .await;
        assert_eq!(result.results.into_iter().map(|r| r.unwrap()).collect::<Vec<_>>(), vec![2]);
        assert_eq!(result.total_retried, 1);
        assert_eq!(result.total_failed, 0);
    }

    #[tokio::test]
    async fn scenario_4_permanent_error_not_retried() {
        let config: ProcessorConfig<TestError> = ProcessorConfig::builder().build();
        let result = process(
            vec![1, 2, 3],
            |x: i32| async move {
                if x % 2 == 0 {
                    Err(TestError::ValueError)
                } else {
                    Ok(x * 2)
                }
            },
            config,
        )
        .await;
        assert!(matches!(result.results[0], Ok(2)));
        assert!(matches!(result.results[1], Err(TestError::ValueError)));
        assert!(matches!(result.results[2], Ok(6)));
        assert_eq!(result.total_retried, 0);
        assert_eq!(result.total_failed, 1);
    }

    #[tokio::test]
    async fn handle_throttling_false_suppresses_only_throttling_retries() {
        let config: ProcessorConfig<TestError> = ProcessorConfig::builder()
            .max_attempts(5)
            .handle_throttling(false)
            .build();
        let result = process(
            vec![1],
            |_: i32| async move { Err::<i32, _>(TestError::Throttling) },
            config,
        )
        .await;
        assert_eq!(result.total_failed, 1);
        assert_eq!(result.total_retried, 0);
    }

    #[tokio::test]
    async fn empty_input_returns_zeroed_result() {
        let config: ProcessorConfig<TestError> = ProcessorConfig::builder().build();
        let result = process(Vec::<i32>::new(), |x: i32| async move { Ok(x) }, config).await;
        assert_eq!(result.results.len(), 0);
        assert_eq!(result.total_processed, 0);
        assert_eq!(result.total_failed, 0);
    }

    #[tokio::test]
    async fn more_workers_than_items_is_fine() {
        let config: ProcessorConfig<TestError> =
            ProcessorConfig::builder().num_workers(50).build();
        let result = process(vec![1, 2], |x: i32| async move { Ok::<_, TestError>(x) }, config).await;
        assert_eq!(result.total_processed, 2);
    }

    #[tokio::test]
    async fn progress_callback_panic_is_swallowed() {
        let config: ProcessorConfig<TestError> = ProcessorConfig::builder()
            .on_progress(|_delta| panic!("boom"))
            .build();
        let result = process(vec![1], |x: i32| async move { Ok::<_, TestError>(x) }, config).await;
        assert_eq!(result.total_processed, 1);
    }
}
