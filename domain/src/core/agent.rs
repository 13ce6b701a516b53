//! Agent identity value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of one participating agent (Value Object)
///
/// An agent is identified by its `family` (a stable group, usually the
/// provider family such as "anthropic" or "openai") and its `variant`
/// (the specific model). The pair is unique within one council request.
///
/// # Example
///
/// ```
/// use council_domain::AgentId;
///
/// let id = AgentId::new("openai", "gpt-5.2");
/// assert_eq!(id.to_string(), "openai/gpt-5.2");
///
/// let parsed: AgentId = "anthropic/claude-sonnet-4.5".parse().unwrap();
/// assert_eq!(parsed.family(), "anthropic");
/// assert_eq!(parsed.variant(), "claude-sonnet-4.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId {
    family: String,
    variant: String,
}

impl AgentId {
    pub fn new(family: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            variant: variant.into(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Canonical display name (`family/variant`)
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.family, self.variant)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.family, self.variant)
    }
}

impl From<&str> for AgentId {
    /// Parses `family/variant`. A bare variant such as `gpt-5.2` takes the
    /// text before the first `-` or `_` as its family.
    fn from(s: &str) -> Self {
        match s.split_once('/') {
            Some((family, variant)) => AgentId::new(family, variant),
            None => {
                let family = s.split(['-', '_']).next().unwrap_or(s);
                AgentId::new(family, s)
            }
        }
    }
}

impl std::str::FromStr for AgentId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AgentId::from(s))
    }
}

impl Serialize for AgentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.display_name())
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AgentId::from(s.as_str()))
    }
}
