//! # Circuit Breaker Module
//!
//! Stops calling the vision model for a while after repeated extraction
//! failures, so a failing upstream is not hammered with retries.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::ocr_config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for text extraction requests
///
/// - **Closed**: requests pass through
/// - **Open**: `circuit_breaker_threshold` consecutive failures happened less
///   than `circuit_breaker_reset_secs` ago; requests fail fast
/// - After the reset timeout the breaker closes again on the next check
///
/// ```rust
/// use skinsight::circuit_breaker::CircuitBreaker;
/// use skinsight::ocr_config::RecoveryConfig;
///
/// let breaker = CircuitBreaker::new(RecoveryConfig::default());
/// assert!(!breaker.is_open());
/// ```
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    /// Whether requests should be refused right now
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }
        match state.last_failure {
            Some(at) if at.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) => true,
            _ => {
                info!("Circuit breaker reset after timeout");
                *state = BreakerState::default();
                false
            }
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());
        if state.failure_count == self.config.circuit_breaker_threshold {
            warn!(failures = state.failure_count, "Circuit breaker opened");
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = BreakerState::default();
    }
}
