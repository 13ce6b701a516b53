//! Request summary and full outcome snapshot

use crate::core::agent::AgentId;
use crate::core::request::RequestId;
use crate::discussion::state::DiscussionState;
use crate::ranking::borda::Podium;
use crate::ranking::outcome::RankingOutcome;
use crate::round::ledger::LatestReplies;
use crate::round::record::RoundRecord;
use crate::round::reply::TokenUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answer of the first gold agent (declaration order) that has a reply
///
/// Empty when no gold agent ever replied.
pub fn winning_answer(agents: &[AgentId], podium: &Podium, replies: &LatestReplies) -> String {
    agents
        .iter()
        .filter(|a| podium.gold.contains(a))
        .find_map(|a| replies.answer_of(a))
        .unwrap_or_default()
        .to_string()
}

/// Compact result of one finished council request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilSummary {
    pub request_id: RequestId,
    pub question: String,
    pub agents: Vec<AgentId>,
    pub total_rounds: u32,
    pub completed_rounds: u32,
    pub podium: Podium,
    pub winning_answer: String,
    pub fallback_used: bool,
    /// Refinement plus ranking usage per agent
    pub tokens: BTreeMap<AgentId, TokenUsage>,
    pub total_tokens: TokenUsage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CouncilSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Sum per-agent usage from round records and extra (ranking) usage
    pub fn tally_tokens(
        agents: &[AgentId],
        records: &[RoundRecord],
        extra: &BTreeMap<AgentId, TokenUsage>,
    ) -> BTreeMap<AgentId, TokenUsage> {
        let mut tokens: BTreeMap<AgentId, TokenUsage> = agents
            .iter()
            .map(|a| (a.clone(), TokenUsage::default()))
            .collect();
        for record in records {
            *tokens.entry(record.agent.clone()).or_default() += record.tokens;
        }
        for (agent, usage) in extra {
            *tokens.entry(agent.clone()).or_default() += *usage;
        }
        tokens
    }
}

/// Completion status written by the persistence sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionStatus {
    Completed,
    /// Every round finished but the vote was cancelled; the podium is whatever
    /// the ballots collected so far (usually the fallback) produced
    RankingCancelled,
    Cancelled { completed_rounds: u32 },
}

/// Everything a request produced, for offline rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilOutcome {
    pub summary: CouncilSummary,
    pub records: Vec<RoundRecord>,
    pub ranking: RankingOutcome,
    pub discussion: DiscussionState,
}

impl CouncilOutcome {
    /// Records of one round in the order they were stored
    pub fn round(&self, round: u32) -> impl Iterator<Item = &RoundRecord> {
        self.records.iter().filter(move |r| r.round == round)
    }
}
