//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types.

mod council;
mod output;
mod retry;

pub use council::FileCouncilConfig;
pub use output::FileOutputConfig;
pub use retry::FileRetryConfig;

use council_application::CouncilParams;
use council_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round count, timeouts and label seed
    pub council: FileCouncilConfig,
    /// Backoff schedule for refinement calls
    pub retry: FileRetryConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.council.validate();
        issues.extend(self.retry.validate());
        issues.extend(self.output.parse_format().1);
        issues
    }

    /// Execution parameters for the council use case
    pub fn to_params(&self) -> CouncilParams {
        let params = CouncilParams::default()
            .with_rounds(self.council.rounds)
            .with_agent_timeout(self.council.agent_timeout())
            .with_ranking_timeout(self.council.ranking_timeout())
            .with_retry(self.retry.to_retry_config());
        match self.council.seed {
            Some(seed) => params.with_seed(seed),
            None => params,
        }
    }
}
