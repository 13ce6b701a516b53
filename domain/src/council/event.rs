//! Lifecycle events emitted while a council request runs.

use crate::core::agent::AgentId;
use crate::core::request::RequestId;
use crate::ranking::borda::Podium;
use crate::round::reply::{Reply, TokenUsage};
use serde::{Deserialize, Serialize};

/// One lifecycle event
///
/// Serialized with a `type` tag so a transport layer can forward it as is:
///
/// ```
/// use council_domain::CouncilEvent;
///
/// let json = serde_json::to_value(CouncilEvent::RoundStart { round: 1, total: 3 }).unwrap();
/// assert_eq!(json["type"], "round_start");
/// assert_eq!(json["total"], 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    /// A new request started; consumers should reset their view
    Clear,
    RoundStart {
        round: u32,
        total: u32,
    },
    Response {
        model: AgentId,
        round: u32,
        answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
        discussion_targets: Vec<String>,
        tokens_in: u64,
        tokens_out: u64,
    },
    Error {
        model: AgentId,
        round: u32,
        error: String,
    },
    RankingStart,
    Winner {
        gold: Vec<AgentId>,
        silver: Vec<AgentId>,
        bronze: Vec<AgentId>,
        answer: String,
    },
}

impl CouncilEvent {
    pub fn response(model: &AgentId, round: u32, reply: &Reply, usage: TokenUsage) -> Self {
        CouncilEvent::Response {
            model: model.clone(),
            round,
            answer: reply.answer.clone(),
            rationale: reply.rationale.clone(),
            discussion_targets: reply.discussion_targets(),
            tokens_in: usage.input,
            tokens_out: usage.output,
        }
    }

    pub fn error(model: &AgentId, round: u32, error: impl Into<String>) -> Self {
        CouncilEvent::Error {
            model: model.clone(),
            round,
            error: error.into(),
        }
    }

    pub fn winner(podium: &Podium, answer: impl Into<String>) -> Self {
        CouncilEvent::Winner {
            gold: podium.gold.clone(),
            silver: podium.silver.clone(),
            bronze: podium.bronze.clone(),
            answer: answer.into(),
        }
    }

    /// The `type` tag this event serializes with
    pub fn kind(&self) -> &'static str {
        match self {
            CouncilEvent::Clear => "clear",
            CouncilEvent::RoundStart { .. } => "round_start",
            CouncilEvent::Response { .. } => "response",
            CouncilEvent::Error { .. } => "error",
            CouncilEvent::RankingStart => "ranking_start",
            CouncilEvent::Winner { .. } => "winner",
        }
    }
}

/// An event tagged with the request it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub request_id: RequestId,
    #[serde(flatten)]
    pub event: CouncilEvent,
}

impl EventEnvelope {
    pub fn new(request_id: RequestId, event: CouncilEvent) -> Self {
        Self { request_id, event }
    }
}
