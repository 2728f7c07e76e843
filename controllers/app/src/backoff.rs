//! # Fibonacci Backoff
//!
//! Requeue delays for failed reconciliations. Each object keeps its own
//! Fibonacci sequence (min, min, 2*min, 3*min, 5*min, ...) capped at a maximum,
//! and the sequence restarts once the object reconciles successfully.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each call to `next_backoff` returns the current delay and advances to the
/// sum of the previous two, capped at `max_seconds`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff value in seconds
    prev_seconds: u64,
    /// Current backoff value in seconds
    current_seconds: u64,
    /// Maximum backoff value in seconds
    max_seconds: u64,
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff bounded by `min_seconds` and `max_seconds`.
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            prev_seconds: 0,
            current_seconds: min_seconds.min(max_seconds),
            max_seconds,
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_seconds;

        let next = self.prev_seconds.saturating_add(self.current_seconds);
        self.prev_seconds = self.current_seconds;
        self.current_seconds = next.min(self.max_seconds);

        Duration::from_secs(result)
    }
}

/// Per-object backoff state, keyed by `namespace/name`.
#[derive(Debug)]
pub struct BackoffTracker {
    min_seconds: u64,
    max_seconds: u64,
    states: Mutex<HashMap<String, BackoffState>>,
}

#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffTracker {
    /// Creates a tracker whose sequences run from `min_seconds` to `max_seconds`.
    #[must_use]
    pub fn new(min_seconds: u64, max_seconds: u64) -> Self {
        Self {
            min_seconds,
            max_seconds,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Records a failure for `key` and returns how long to wait before retrying.
    pub fn record_failure(&self, key: &str) -> Duration {
        let mut states = self
            .states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let state = states.entry(key.to_string()).or_insert_with(|| BackoffState {
            backoff: FibonacciBackoff::new(self.min_seconds, self.max_seconds),
            error_count: 0,
        });
        state.error_count = state.error_count.saturating_add(1);
        state.backoff.next_backoff()
    }

    /// Drops the failure history of `key`, either after a successful
    /// reconcile or once the object is gone from the cache.
    pub fn forget(&self, key: &str) {
        let mut states = self
            .states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        states.remove(key);
    }

    /// Consecutive failures recorded for `key`.
    pub fn error_count(&self, key: &str) -> u32 {
        let states = self
            .states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        states.get(key).map_or(0, |state| state.error_count)
    }

    /// Number of objects with failure history.
    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
