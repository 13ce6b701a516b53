//! Output format value object

use serde::{Deserialize, Serialize};

/// How a council outcome is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every round, the ballots and the podium (default)
    #[default]
    Full,
    /// Only the podium and the winning answer
    Podium,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Podium => "podium",
            OutputFormat::Json => "json",
        }
    }

    /// Parse a config value; `None` for unknown names
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(OutputFormat::Full),
            "podium" => Some(OutputFormat::Podium),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(OutputFormat::default(), OutputFormat::Full);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Podium).unwrap();
        assert_eq!(json, "\"podium\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("synthesis"), None);
    }
}
