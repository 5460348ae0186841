//! Retry Policy
//!
//! Decides whether a failed reasoning-service call is tried again and how long
//! to wait first. The orchestrator owns the loop; this type only answers
//! questions about it.

use crate::error::{ServiceError, ServiceErrorKind};
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

/// Bounded retry with exponential backoff for service-level failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Never below 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
    pub max_backoff: Duration,
    /// Adds up to a quarter of the computed delay at random.
    pub jitter: bool,
    pub retryable: HashSet<ServiceErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2,
            max_backoff: Duration::from_secs(4),
            jitter: true,
            retryable: HashSet::from([
                ServiceErrorKind::Network,
                ServiceErrorKind::RateLimited,
                ServiceErrorKind::Timeout,
                ServiceErrorKind::EmptyResponse,
            ]),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn is_retryable(&self, kind: ServiceErrorKind) -> bool {
        self.retryable.contains(&kind)
    }

    /// Whether another attempt should follow the failed attempt number `attempt`.
    pub fn should_retry(&self, error: &ServiceError, attempt: u32) -> bool {
        attempt < self.max_attempts && self.is_retryable(error.kind)
    }

    /// Delay before the attempt that follows attempt number `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        let base = self
            .initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let spread = (base.as_millis() / 4) as u64;
        base + Duration::from_millis(rand::rng().random_range(0..=spread))
    }
}
