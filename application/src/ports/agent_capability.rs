//! Agent capability port
//!
//! Defines the interface the council uses to talk to one model.
//! Vendor adapters live outside the core; the council only sees this trait.

use crate::context::{CallContext, ContextError};
use async_trait::async_trait;
use council_domain::{AgentId, DiscussionMessage, Question, Reply, RoundMeta, RoundReply, TokenUsage};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during an agent call
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Cancelled before attempt {attempt}: {reason}")]
    CancelledBeforeAttempt { attempt: u32, reason: ContextError },

    #[error("Cancelled during backoff after attempt {attempt}: {reason}")]
    CancelledDuringBackoff { attempt: u32, reason: ContextError },

    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: Box<AgentError>,
    },

    #[error("Agent task panicked: {0}")]
    Panicked(String),
}

impl AgentError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::Request(_) | AgentError::RateLimited(_) | AgentError::InvalidResponse(_)
        )
    }

    /// Failures caused by cancellation or a deadline rather than the agent
    pub fn is_cancellation(&self) -> bool {
        match self {
            AgentError::Context(_)
            | AgentError::CancelledBeforeAttempt { .. }
            | AgentError::CancelledDuringBackoff { .. } => true,
            AgentError::RetriesExhausted { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

/// Everything an agent sees when answering one refinement round
///
/// Built from state frozen at the end of the previous round: on round 1
/// `replies` and `threads` are empty.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub question: Question,
    pub meta: RoundMeta,
    /// Latest reply of every agent that has answered, in declaration order
    pub replies: Vec<(AgentId, RoundReply)>,
    /// This agent's discussion threads, keyed by the other party
    pub threads: BTreeMap<AgentId, Vec<DiscussionMessage>>,
}

/// Structured reply plus token usage
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    pub reply: Reply,
    pub usage: TokenUsage,
}

impl AgentResponse {
    pub fn new(reply: Reply, usage: TokenUsage) -> Self {
        Self { reply, usage }
    }
}

/// Anonymized ranking request
#[derive(Debug, Clone)]
pub struct RankingRequest {
    pub system: String,
    pub prompt: String,
    /// The answers shown in `prompt`, under their labels
    pub answers: Vec<(char, String)>,
}

/// Free-text completion plus token usage
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

impl Completion {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// One model behind the council
///
/// Implementations must be safe to call concurrently; each call is
/// independent from the council's point of view. Implementations should
/// observe `ctx`, but the council also abandons calls that outlive it.
#[async_trait]
pub trait AgentCapability: Send + Sync {
    /// Answer one refinement round
    async fn prompt(
        &self,
        ctx: &CallContext,
        request: &PromptRequest,
    ) -> Result<AgentResponse, AgentError>;

    /// Rank anonymized answers
    async fn rank(
        &self,
        ctx: &CallContext,
        request: &RankingRequest,
    ) -> Result<Completion, AgentError>;
}

/// An active council member
#[derive(Clone)]
pub struct CouncilAgent {
    pub id: AgentId,
    /// Timeout override for this agent's round, retries included, and its ranking call
    pub timeout: Option<Duration>,
    pub capability: Arc<dyn AgentCapability>,
}

impl CouncilAgent {
    pub fn new(id: AgentId, capability: Arc<dyn AgentCapability>) -> Self {
        Self {
            id,
            timeout: None,
            capability,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for CouncilAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouncilAgent")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
