//! A simple async-safe accumulator shared across concurrent tasks.

use tokio::sync::Mutex;

/// Accumulates a running total under a lock, for tallies such as token
/// counts that multiple concurrent requests contribute to.
#[derive(Debug, Default)]
pub struct AsyncCounter {
    value: Mutex<u64>,
}

impl AsyncCounter {
    /// Creates a counter starting at zero.
    pub fn new() -> Self {
        Self {
            value: Mutex::new(0),
        }
    }

    /// Adds `delta` to the running total.
    pub async fn add(&self, delta: u64) {
        let mut guard = self.value.lock().await;
        *guard += delta;
    }

    /// Returns the current total.
    pub async fn value(&self) -> u64 {
        *self.value.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn accumulates_across_tasks() {
        let counter = Arc::new(AsyncCounter::new());
        let mut handles = Vec::new();
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                for _ in 0..10 {
                    counter.add(1).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.value().await, 100);
    }

    #[tokio::test]
    async fn starts_at_zero() {
        let counter = AsyncCounter::new();
        assert_eq!(counter.value().await, 0);
    }
}
