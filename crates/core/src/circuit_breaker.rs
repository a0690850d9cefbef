// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Tunables for [`CircuitBreaker`]. Defaults mirror spec.md §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Events admitted per `window_ms` before the breaker trips Open.
    pub burst_threshold: usize,
    pub window_ms: u64,
    /// Minimum quiet time since the last trip before Open may close again.
    pub quiet_period_ms: u64,
    /// While Open, admit 1 event per `sample_rate`.
    pub sample_rate: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { burst_threshold: 200, window_ms: 1_000, quiet_period_ms: 500, sample_rate: 4 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub total_accepted: u64,
    pub total_rejected: u64,
    pub in_window: usize,
}

struct Inner {
    state: CircuitState,
    event_times: VecDeque<u64>,
    last_trip: Option<u64>,
    total_accepted: u64,
    total_rejected: u64,
    sample_counter: u32,
}

/// Burst detector for the ingestion path. Closed admits everything; once
/// the in-window arrival rate exceeds `burst_threshold` it trips Open and
/// admits only every `sample_rate`th event until the rate subsides for at
/// least `quiet_period_ms`.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                event_times: VecDeque::new(),
                last_trip: None,
                total_accepted: 0,
                total_rejected: 0,
                sample_counter: 0,
            }),
        }
    }

    pub fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    /// Records an arrival at `now_ms` and returns whether it should be
    /// admitted downstream.
    pub fn admit(&self, now_ms: u64) -> bool {
        let mut inner = self.inner.lock();

        let cutoff = now_ms.saturating_sub(self.config.window_ms);
        while matches!(inner.event_times.front(), Some(&t) if t < cutoff) {
            inner.event_times.pop_front();
        }
        inner.event_times.push_back(now_ms);
        let count = inner.event_times.len();

        let admitted = match inner.state {
            CircuitState::Closed => {
                if count > self.config.burst_threshold {
                    inner.state = CircuitState::Open;
                    inner.last_trip = Some(now_ms);
                    inner.sample_counter = 0;
                    tracing::warn!(count, threshold = self.config.burst_threshold, "circuit breaker tripped open");
                }
                true
            }
            CircuitState::Open => {
                let quiet_elapsed = inner
                    .last_trip
                    .map(|t| now_ms.saturating_sub(t) >= self.config.quiet_period_ms)
                    .unwrap_or(true);
                if quiet_elapsed {
                    inner.state = CircuitState::Closed;
                    inner.last_trip = None;
                    inner.sample_counter = 0;
                    inner.event_times.clear();
                    inner.event_times.push_back(now_ms);
                    tracing::info!("circuit breaker closed");
                    true
                } else {
                    inner.sample_counter += 1;
                    if inner.sample_counter >= self.config.sample_rate {
                        inner.sample_counter = 0;
                        true
                    } else {
                        false
                    }
                }
            }
        };

        if admitted {
            inner.total_accepted += 1;
        } else {
            inner.total_rejected += 1;
        }
        admitted
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock();
        CircuitBreakerStats {
            state: inner.state,
            total_accepted: inner.total_accepted,
            total_rejected: inner.total_rejected,
            in_window: inner.event_times.len(),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }
}

#[cfg(test)]
#[path = "circuit_breaker_tests.rs"]
mod tests;
