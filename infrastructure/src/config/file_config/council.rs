//! Council configuration from TOML (`[council]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! rounds = 3
//! agent_timeout_secs = 120
//! ranking_timeout_secs = 90
//! seed = 42
//! ```

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw council configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Number of refinement rounds
    pub rounds: u32,
    /// Default time budget of one agent's round, retries and backoff included
    pub agent_timeout_secs: u64,
    /// Time budget of one ranking call
    pub ranking_timeout_secs: u64,
    /// Seed for the anonymization shuffle; random when absent
    pub seed: Option<u64>,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            agent_timeout_secs: 120,
            ranking_timeout_secs: 120,
            seed: None,
        }
    }
}

impl FileCouncilConfig {
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    pub fn ranking_timeout(&self) -> Duration {
        Duration::from_secs(self.ranking_timeout_secs)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.rounds == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroRounds,
                "council.rounds must be at least 1",
            ));
        }
        for (field, value) in [
            ("agent_timeout_secs", self.agent_timeout_secs),
            ("ranking_timeout_secs", self.ranking_timeout_secs),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroTimeout,
                    format!("council.{} cannot be 0", field),
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_council_config_default() {
        let config = FileCouncilConfig::default();
        assert_eq!(config.rounds, 3);
        assert_eq!(config.agent_timeout(), Duration::from_secs(120));
        assert!(config.seed.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_zero_values_are_errors() {
        let config = FileCouncilConfig {
            rounds: 0,
            ranking_timeout_secs: 0,
            ..Default::default()
        };
        let codes: Vec<_> = config.validate().iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![ConfigIssueCode::ZeroRounds, ConfigIssueCode::ZeroTimeout]);
    }
}
