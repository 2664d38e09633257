//! An AIMD-tuned concurrency gate.
//!
//! [`AdaptiveGate`] behaves like a semaphore whose capacity adjusts itself:
//! a multiplicative decrease on [`AdaptiveGate::on_throttle`], an additive
//! increase after a run of [`AdaptiveGate::on_success`] calls. Capacity can
//! grow without bound; it never drops below the configured minimum.

use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

/// How capacity transitions are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Debug,
    #[default]
    Info,
}

/// Configuration error raised by [`GateConfigBuilder::build`].
#[derive(Debug, thiserror::Error)]
pub enum GateConfigError {
    #[error("decrease_factor must be strictly between 0 and 1, got {0}")]
    InvalidDecreaseFactor(f64),
    #[error("initial ({initial}) must be >= min_value ({min_value})")]
    InitialBelowMin { initial: usize, min_value: usize },
}

/// Fixed parameters for an [`AdaptiveGate`].
#[derive(Debug, Clone)]
pub struct GateConfig {
    initial: usize,
    min_value: usize,
    decrease_factor: f64,
    increase_threshold: usize,
    log_level: LogLevel,
}

impl GateConfig {
    pub fn builder() -> GateConfigBuilder {
        GateConfigBuilder::default()
    }
}

/// Builder for [`GateConfig`].
pub struct GateConfigBuilder {
    initial: usize,
    min_value: usize,
    decrease_factor: f64,
    increase_threshold: Option<usize>,
    log_level: LogLevel,
}

impl Default for GateConfigBuilder {
    fn default() -> Self {
        Self {
            initial: 4,
            min_value: 1,
            decrease_factor: 0.5,
            increase_threshold: None,
            log_level: LogLevel::Info,
        }
    }
}

impl GateConfigBuilder {
    pub fn initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    pub fn min_value(mut self, min_value: usize) -> Self {
        self.min_value = min_value;
        self
    }

    pub fn decrease_factor(mut self, decrease_factor: f64) -> Self {
        self.decrease_factor = decrease_factor;
        self
    }

    /// Number of consecutive successes required before capacity grows by one.
    /// Defaults to `10 * initial` when left unset.
    pub fn increase_threshold(mut self, increase_threshold: usize) -> Self {
        self.increase_threshold = Some(increase_threshold);
        self
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn build(self) -> Result<GateConfig, GateConfigError> {
        if !(self.decrease_factor > 0.0 && self.decrease_factor < 1.0) {
            return Err(GateConfigError::InvalidDecreaseFactor(self.decrease_factor));
        }
        if self.initial < self.min_value {
            return Err(GateConfigError::InitialBelowMin {
                initial: self.initial,
                min_value: self.min_value,
            });
        }
        Ok(GateConfig {
            increase_threshold: self.increase_threshold.unwrap_or(self.initial * 10),
            initial: self.initial,
            min_value: self.min_value,
            decrease_factor: self.decrease_factor,
            log_level: self.log_level,
        })
    }
}

#[derive(Debug)]
struct GateState {
    capacity: usize,
    current_count: usize,
    success_count: usize,
}

/// An adaptive concurrency gate: acquire a slot, release it, and feed back
/// success/throttle signals so capacity tracks what the downstream service
/// can actually sustain.
#[derive(Debug)]
pub struct AdaptiveGate {
    state: Mutex<GateState>,
    notify: Notify,
    min_value: usize,
    decrease_factor: f64,
    increase_threshold: usize,
    log_level: LogLevel,
}

impl AdaptiveGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            state: Mutex::new(GateState {
                capacity: config.initial,
                current_count: 0,
                success_count: 0,
            }),
            notify: Notify::new(),
            min_value: config.min_value,
            decrease_factor: config.decrease_factor,
            increase_threshold: config.increase_threshold,
            log_level: config.log_level,
        }
    }

    /// Acquires a slot, waiting if the gate is at capacity. Returns a guard
    /// that releases the slot when dropped.
    pub async fn acquire(&self) -> GateGuard<'_> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            {
                let mut state = self.state.lock().expect("gate mutex poisoned");
                if state.current_count < state.capacity {
                    state.current_count += 1;
                    return GateGuard { gate: self };
                }
            }
            notified.await;
        }
    }

    /// Like [`Self::acquire`] but gives up after `duration`.
    pub async fn acquire_timeout(&self, duration: Duration) -> Option<GateGuard<'_>> {
        timeout(duration, self.acquire()).await.ok()
    }

    fn release(&self) {
        let mut state = self.state.lock().expect("gate mutex poisoned");
        state.current_count = state.current_count.saturating_sub(1);
        self.notify.notify_one();
    }

    /// Multiplicative decrease: call this after observing a throttling
    /// response from the downstream service.
    pub fn on_throttle(&self) {
        let mut state = self.state.lock().expect("gate mutex poisoned");
        let old_capacity = state.capacity;
        let new_capacity = self
            .min_value
            .max((state.capacity as f64 * self.decrease_factor) as usize);
        if new_capacity < old_capacity {
            state.capacity = new_capacity;
            state.success_count = 0;
            self.log_change("throttle", old_capacity, new_capacity);
        }
    }

    /// Additive increase: call this after every successful downstream call.
    /// Capacity grows by one once `increase_threshold` consecutive
    /// successes have been recorded.
    pub fn on_success(&self) {
        let mut state = self.state.lock().expect("gate mutex poisoned");
        state.success_count += 1;
        if state.success_count >= self.increase_threshold {
            let old_capacity = state.capacity;
            state.capacity += 1;
            state.success_count = 0;
            self.notify.notify_one();
            self.log_change("success", old_capacity, state.capacity);
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().expect("gate mutex poisoned").capacity
    }

    pub fn current_count(&self) -> usize {
        self.state.lock().expect("gate mutex poisoned").current_count
    }

    pub fn success_count(&self) -> usize {
        self.state.lock().expect("gate mutex poisoned").success_count
    }

    fn log_change(&self, reason: &str, old_capacity: usize, new_capacity: usize) {
        if self.log_level == LogLevel::Off {
            return;
        }
        #[cfg(feature = "tracing")]
        {
            match self.log_level {
                LogLevel::Debug => {
                    tracing::debug!(reason, old_capacity, new_capacity, "gate capacity adjusted")
                }
                LogLevel::Info => {
                    tracing::info!(reason, old_capacity, new_capacity, "gate capacity adjusted")
                }
                LogLevel::Off => {}
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = (reason, old_capacity, new_capacity);
    }
}

/// RAII guard returned by [`AdaptiveGate::acquire`]; releases the slot when
/// dropped so every exit path, including panics, frees it.
pub struct GateGuard<'a> {
    gate: &'a AdaptiveGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn rejects_invalid_decrease_factor() {
        let result = GateConfig::builder().decrease_factor(1.5).build();
        assert!(matches!(
            result,
            Err(GateConfigError::InvalidDecreaseFactor(_))
        ));
    }

    #[test]
    fn rejects_initial_below_min() {
        let result = GateConfig::builder().initial(1).min_value(4).build();
        assert!(matches!(
            result,
            Err(GateConfigError::InitialBelowMin { .. })
        ));
    }

    #[test]
    fn default_increase_threshold_is_ten_times_initial() {
        let config = GateConfig::builder().initial(4).build().unwrap();
        assert_eq!(config.increase_threshold, 40);
    }

    #[tokio::test]
    async fn acquire_respects_capacity() {
        let gate = AdaptiveGate::new(GateConfig::builder().initial(2).build().unwrap());
        let g1 = gate.acquire().await;
        let g2 = gate.acquire().await;
        assert_eq!(gate.current_count(), 2);

        let gate = Arc::new(gate);
        let gate_clone = Arc::clone(&gate);
        let acquired = Arc::new(AtomicUsize::new(0));
        let acquired_clone = Arc::clone(&acquired);
        let handle = tokio::spawn(async move {
            let _g3 = gate_clone.acquire().await;
            acquired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::task::yield_now().await;
        assert_eq!(acquired.load(Ordering::SeqCst), 0);

        drop(g1);
        handle.await.unwrap();
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
        drop(g2);
    }

    #[test]
    fn on_throttle_halves_capacity() {
        let gate = AdaptiveGate::new(GateConfig::builder().initial(10).build().unwrap());
        gate.on_throttle();
        assert_eq!(gate.capacity(), 5);
    }

    #[test]
    fn on_throttle_never_drops_below_min_value() {
        let gate = AdaptiveGate::new(
            GateConfig::builder()
                .initial(2)
                .min_value(2)
                .build()
                .unwrap(),
        );
        gate.on_throttle();
        assert_eq!(gate.capacity(), 2);
    }

    #[test]
    fn on_throttle_resets_success_count() {
        let gate = AdaptiveGate::new(
            GateConfig::builder()
                .initial(10)
                .increase_threshold(5)
                .build()
                .unwrap(),
        );
        gate.on_success();
        gate.on_success();
        gate.on_throttle();
        assert_eq!(gate.success_count(), 0);
    }

    #[test]
    fn on_success_increases_after_threshold() {
        let gate = AdaptiveGate::new(
            GateConfig::builder()
                .initial(4)
                .increase_threshold(3)
                .build()
                .unwrap(),
        );
        gate.on_success();
        gate.on_success();
        assert_eq!(gate.capacity(), 4);
        gate.on_success();
        assert_eq!(gate.capacity(), 5);
        assert_eq!(gate.success_count(), 0);
    }

    #[test]
    fn capacity_can_grow_without_bound() {
        let gate = AdaptiveGate::new(
            GateConfig::builder()
                .initial(1)
                .increase_threshold(1)
                .build()
                .unwrap(),
        );
        for _ in 0..200 {
            gate.on_success();
        }
        assert_eq!(gate.capacity(), 201);
    }

    #[tokio::test]
    async fn acquire_timeout_gives_up() {
        let gate = AdaptiveGate::new(GateConfig::builder().initial(1).build().unwrap());
        let _held = gate.acquire().await;
        let result = gate.acquire_timeout(Duration::from_millis(20)).await;
        assert!(result.is_none());
    }
}
