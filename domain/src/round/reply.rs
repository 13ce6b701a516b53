//! Reply value objects produced by agents during refinement rounds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One agent's reply for one round
///
/// `discussion` maps a free-text target agent name (as written by the model)
/// to the message addressed to that agent. Target names are resolved against
/// the active agent set when the reply is merged into the discussion state.
///
/// # Example
///
/// ```
/// use council_domain::Reply;
///
/// let reply = Reply::new("42")
///     .with_rationale("Deep Thought said so")
///     .with_message("gpt-5.2", "Please show your derivation.");
/// assert_eq!(reply.discussion_targets(), vec!["gpt-5.2".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub discussion: BTreeMap<String, String>,
}

impl Reply {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            rationale: None,
            discussion: BTreeMap::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Address a discussion message to another agent (by free-text name)
    pub fn with_message(mut self, target: impl Into<String>, message: impl Into<String>) -> Self {
        self.discussion.insert(target.into(), message.into());
        self
    }

    /// Target names as written by the model, in sorted order
    pub fn discussion_targets(&self) -> Vec<String> {
        self.discussion.keys().cloned().collect()
    }
}

/// Token usage reported by an agent call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }

    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

impl std::ops::Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self::Output {
        TokenUsage::new(self.input + rhs.input, self.output + rhs.output)
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input += rhs.input;
        self.output += rhs.output;
    }
}

/// Round metadata handed to every agent call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundMeta {
    /// Current round (1-indexed)
    pub round: u32,
    pub total_rounds: u32,
    /// Display names of every other active agent
    pub other_agents: Vec<String>,
}

impl RoundMeta {
    pub fn is_first(&self) -> bool {
        self.round == 1
    }

    pub fn is_last(&self) -> bool {
        self.round == self.total_rounds
    }
}
