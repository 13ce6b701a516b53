//! Council parameters: use case loop control.
//!
//! [`CouncilParams`] groups the static parameters that control the
//! round loop in [`RunCouncilUseCase`](crate::use_cases::run_council::RunCouncilUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff schedule for one agent call.
///
/// The delay after failed attempt `n` (0-indexed) is
/// `min(initial_delay * multiplier^n, max_delay)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A single attempt with no backoff
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Backoff before the attempt following failed attempt `attempt` (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(0.0).powi(attempt as i32);
        let millis = self.initial_delay.as_millis() as f64 * factor;
        if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(millis as u64)
        }
    }
}

/// Round loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilParams {
    /// Number of refinement rounds (R).
    pub rounds: u32,
    /// Time budget of one agent's whole round, retries and backoff included,
    /// for agents without their own override.
    pub agent_timeout: Duration,
    /// Time budget of one judge's ranking call.
    pub ranking_timeout: Duration,
    /// Retry schedule for refinement calls. Ranking calls are never retried.
    pub retry: RetryConfig,
    /// Seed for the anonymization RNG; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for CouncilParams {
    fn default() -> Self {
        Self {
            rounds: 3,
            agent_timeout: Duration::from_secs(120),
            ranking_timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
            seed: None,
        }
    }
}

impl CouncilParams {
    // ==================== Builder Methods ====================

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_ranking_timeout(mut self, timeout: Duration) -> Self {
        self.ranking_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
