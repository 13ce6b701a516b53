//! Latest-reply-per-agent bookkeeping.

use super::reply::Reply;
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A reply together with the round that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReply {
    pub round: u32,
    pub reply: Reply,
}

/// The most recent reply of every agent that has answered so far
///
/// A newer reply replaces the previous one for the same agent. An agent that
/// fails a round keeps its earlier reply, which stays visible to the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestReplies {
    replies: HashMap<AgentId, RoundReply>,
}

impl LatestReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `reply` as the latest for `agent`, returning the one it replaced
    pub fn record(&mut self, agent: AgentId, round: u32, reply: Reply) -> Option<RoundReply> {
        self.replies.insert(agent, RoundReply { round, reply })
    }

    pub fn get(&self, agent: &AgentId) -> Option<&RoundReply> {
        self.replies.get(agent)
    }

    pub fn answer_of(&self, agent: &AgentId) -> Option<&str> {
        self.replies.get(agent).map(|r| r.reply.answer.as_str())
    }

    pub fn contains(&self, agent: &AgentId) -> bool {
        self.replies.contains_key(agent)
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }

    /// Replies in the given declaration order, skipping agents without one
    pub fn in_order<'a>(
        &'a self,
        agents: &'a [AgentId],
    ) -> impl Iterator<Item = (&'a AgentId, &'a RoundReply)> + 'a {
        agents
            .iter()
            .filter_map(|id| self.replies.get(id).map(|r| (id, r)))
    }
}
