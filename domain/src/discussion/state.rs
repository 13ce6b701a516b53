//! Bidirectional discussion threads between agents.

use super::message::DiscussionMessage;
use super::target::{UnresolvedTarget, resolve_target};
use crate::core::agent::AgentId;
use crate::round::reply::Reply;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Append-only message threads, indexed from each participant's side
///
/// A message from A to B is stored in A's thread with B *and* in B's thread
/// with A, so either agent can look up "my thread with X" directly.
///
/// # Example
///
/// ```
/// use council_domain::{AgentId, DiscussionState};
///
/// let a = AgentId::new("openai", "gpt-5.2");
/// let b = AgentId::new("google", "gemini-3-pro");
///
/// let mut state = DiscussionState::new();
/// state.post(&a, &b, "Why 42?", 1);
///
/// assert_eq!(state.thread(&a, &b), state.thread(&b, &a));
/// assert_eq!(state.thread(&b, &a)[0].message, "Why 42?");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionState {
    threads: HashMap<AgentId, HashMap<AgentId, Vec<DiscussionMessage>>>,
}

/// Result of merging one reply's discussion targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Agents that received a message, in target-name order
    pub delivered: Vec<AgentId>,
    /// Targets that could not be resolved; their messages were dropped
    pub unresolved: Vec<UnresolvedTarget>,
}

impl DiscussionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message from `from` to `to` in both participants' views
    pub fn post(&mut self, from: &AgentId, to: &AgentId, message: impl Into<String>, round: u32) {
        let entry = DiscussionMessage::new(from.clone(), message, round);
        self.threads
            .entry(to.clone())
            .or_default()
            .entry(from.clone())
            .or_default()
            .push(entry.clone());
        self.threads
            .entry(from.clone())
            .or_default()
            .entry(to.clone())
            .or_default()
            .push(entry);
    }

    /// Merge the discussion targets of `reply` written by `sender` in `round`
    ///
    /// Every target name is resolved against `agents`; unresolvable names are
    /// reported back and their messages are not stored.
    pub fn merge_reply(
        &mut self,
        sender: &AgentId,
        reply: &Reply,
        round: u32,
        agents: &[AgentId],
    ) -> MergeReport {
        let mut report = MergeReport::default();
        for (target_name, message) in &reply.discussion {
            match resolve_target(target_name, sender, agents) {
                Ok(target) => {
                    self.post(sender, target, message.as_str(), round);
                    report.delivered.push(target.clone());
                }
                Err(unresolved) => report.unresolved.push(unresolved),
            }
        }
        report
    }

    /// `owner`'s thread with `other` (empty if they never exchanged messages)
    pub fn thread(&self, owner: &AgentId, other: &AgentId) -> &[DiscussionMessage] {
        self.threads
            .get(owner)
            .and_then(|t| t.get(other))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every thread `owner` participates in, keyed by the other party
    pub fn threads_of(&self, owner: &AgentId) -> BTreeMap<AgentId, Vec<DiscussionMessage>> {
        self.threads
            .get(owner)
            .map(|t| t.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of distinct messages (each is stored twice)
    pub fn message_count(&self) -> usize {
        self.threads
            .values()
            .flat_map(|t| t.values())
            .map(Vec::len)
            .sum::<usize>()
            / 2
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<AgentId> {
        vec![
            AgentId::new("anthropic", "claude-sonnet-4.5"),
            AgentId::new("openai", "gpt-5.2"),
            AgentId::new("google", "gemini-3-pro"),
        ]
    }

    #[test]
    fn test_post_lands_in_both_views() {
        let agents = agents();
        let (a, b) = (&agents[0], &agents[1]);
        let mut state = DiscussionState::new();

        state.post(a, b, "check your math", 1);

        let expected = vec![DiscussionMessage::new(a.clone(), "check your math", 1)];
        assert_eq!(state.thread(a, b), expected.as_slice());
        assert_eq!(state.thread(b, a), expected.as_slice());
        assert!(state.thread(a, &agents[2]).is_empty());
        assert_eq!(state.message_count(), 1);
    }

    #[test]
    fn test_threads_are_append_only_and_ordered() {
        let agents = agents();
        let (a, b) = (&agents[0], &agents[1]);
        let mut state = DiscussionState::new();

        state.post(a, b, "first", 1);
        state.post(b, a, "reply", 1);
        state.post(a, b, "second", 2);

        let thread: Vec<_> = state.thread(b, a).iter().map(|m| m.message.as_str()).collect();
        assert_eq!(thread, vec!["first", "reply", "second"]);
        assert_eq!(state.thread(a, b), state.thread(b, a));
        assert_eq!(state.message_count(), 3);
    }

    #[test]
    fn test_merge_reply_resolves_and_drops() {
        let agents = agents();
        let sender = &agents[0];
        let reply = Reply::new("answer")
            .with_message("GPT-5.2", "you missed an edge case")
            .with_message("Gemini", "agreed with you")
            .with_message("llama", "hello?")
            .with_message("claude", "note to self");

        let mut state = DiscussionState::new();
        let report = state.merge_reply(sender, &reply, 2, &agents);

        assert_eq!(report.delivered, vec![agents[1].clone(), agents[2].clone()]);
        assert_eq!(report.unresolved.len(), 2);
        assert!(report.unresolved.iter().any(|u| u.name() == "llama"));
        assert!(matches!(
            report.unresolved.iter().find(|u| u.name() == "claude"),
            Some(UnresolvedTarget::SelfAddressed { .. })
        ));

        let msg = &state.thread(&agents[1], sender)[0];
        assert_eq!(msg.from, *sender);
        assert_eq!(msg.round, 2);
        assert_eq!(state.message_count(), 2);
    }

    #[test]
    fn test_threads_of_keys_by_other_party() {
        let agents = agents();
        let mut state = DiscussionState::new();
        state.post(&agents[0], &agents[1], "x", 1);
        state.post(&agents[2], &agents[0], "y", 1);

        let threads = state.threads_of(&agents[0]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[&agents[1]][0].message, "x");
        assert_eq!(threads[&agents[2]][0].message, "y");
        assert!(state.threads_of(&AgentId::new("x", "y")).is_empty());
    }
}
