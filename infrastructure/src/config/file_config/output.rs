//! Output configuration from TOML (`[output]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format name: "full", "podium" or "json"
    pub format: Option<String>,
    /// Enable colored terminal output
    pub color: bool,
    /// Directory for `<request_id>.jsonl` records; persistence is off when unset
    pub results_dir: Option<PathBuf>,
    /// Also write `<request_id>.json` snapshots to `results_dir`
    pub export_snapshot: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            results_dir: None,
            export_snapshot: false,
        }
    }
}

impl FileOutputConfig {
    /// Parse the format name; unknown names fall back to the default with a warning
    pub fn parse_format(&self) -> (OutputFormat, Vec<ConfigIssue>) {
        let Some(name) = &self.format else {
            return (OutputFormat::default(), Vec::new());
        };
        match OutputFormat::parse(name) {
            Some(format) => (format, Vec::new()),
            None => (
                OutputFormat::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownOutputFormat,
                    format!(
                        "output.format: unknown value '{}', falling back to '{}'",
                        name,
                        OutputFormat::default().as_str()
                    ),
                )],
            ),
        }
    }
}
