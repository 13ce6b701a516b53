//! Per-agent round records kept for reporting and persistence.

use super::reply::{Reply, TokenUsage};
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// Outcome of one agent's work for one round (success or final failure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub agent: AgentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub tokens: TokenUsage,
    /// Number of agent calls made, including retries
    pub attempts: u32,
}

impl RoundRecord {
    pub fn success(
        round: u32,
        agent: AgentId,
        reply: Reply,
        tokens: TokenUsage,
        duration_ms: u64,
        attempts: u32,
    ) -> Self {
        Self {
            round,
            agent,
            reply: Some(reply),
            error: None,
            duration_ms,
            tokens,
            attempts,
        }
    }

    pub fn failure(
        round: u32,
        agent: AgentId,
        error: impl Into<String>,
        duration_ms: u64,
        attempts: u32,
    ) -> Self {
        Self {
            round,
            agent,
            reply: None,
            error: Some(error.into()),
            duration_ms,
            tokens: TokenUsage::default(),
            attempts,
        }
    }

    pub fn is_success(&self) -> bool {
        self.reply.is_some()
    }
}
