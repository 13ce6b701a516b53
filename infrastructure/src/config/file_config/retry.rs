//! Retry configuration from TOML (`[retry]` section)

use council_application::RetryConfig;
use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw retry configuration from TOML
///
/// # Example
///
/// ```toml
/// [retry]
/// max_attempts = 4
/// initial_delay_ms = 250
/// max_delay_ms = 4000
/// multiplier = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 8000,
            multiplier: 2.0,
        }
    }
}

impl FileRetryConfig {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: self.multiplier,
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroAttempts,
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.multiplier < 1.0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ShrinkingBackoff,
                format!(
                    "retry.multiplier {} is below 1.0, delays will shrink",
                    self.multiplier
                ),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InitialDelayAboveMax,
                format!(
                    "retry.initial_delay_ms ({}) exceeds retry.max_delay_ms ({}), every delay is capped",
                    self.initial_delay_ms, self.max_delay_ms
                ),
            ));
        }
        issues
    }
}
