//! Anonymization of agent identities for peer ranking.
//!
//! Judges see answers under single-letter labels only, so brand loyalty
//! cannot leak into the vote. Labels are a uniform random permutation of
//! the first `n` letters of the alphabet, drawn from an injected RNG so that
//! tests can seed it and assert exact assignments.

use crate::core::agent::AgentId;
use crate::core::error::DomainError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Largest council that can be anonymized with single letters
pub const MAX_LABELS: usize = 26;

/// One label assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAssignment {
    pub label: char,
    pub agent: AgentId,
}

/// Bijection between agents and single-letter labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationMap {
    /// Sorted by label
    assignments: Vec<LabelAssignment>,
}

impl AnonymizationMap {
    /// Assign a random distinct label to every agent
    pub fn new<R: Rng + ?Sized>(agents: &[AgentId], rng: &mut R) -> Result<Self, DomainError> {
        let mut letters = Self::alphabet(agents)?;
        letters.shuffle(rng);
        Ok(Self::from_letters(agents, letters))
    }

    /// Assign labels in declaration order (`A` to the first agent, ...)
    pub fn sequential(agents: &[AgentId]) -> Result<Self, DomainError> {
        let letters = Self::alphabet(agents)?;
        Ok(Self::from_letters(agents, letters))
    }

    fn alphabet(agents: &[AgentId]) -> Result<Vec<char>, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }
        if agents.len() > MAX_LABELS {
            return Err(DomainError::TooManyAgents {
                count: agents.len(),
                max: MAX_LABELS,
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = agents.iter().find(|a| !seen.insert(*a)) {
            return Err(DomainError::DuplicateAgent(dup.to_string()));
        }
        Ok(('A'..='Z').take(agents.len()).collect())
    }

    fn from_letters(agents: &[AgentId], letters: Vec<char>) -> Self {
        let mut assignments: Vec<LabelAssignment> = letters
            .into_iter()
            .zip(agents)
            .map(|(label, agent)| LabelAssignment {
                label,
                agent: agent.clone(),
            })
            .collect();
        assignments.sort_by_key(|a| a.label);
        Self { assignments }
    }

    pub fn label_of(&self, agent: &AgentId) -> Option<char> {
        self.assignments
            .iter()
            .find(|a| &a.agent == agent)
            .map(|a| a.label)
    }

    /// Decode a label (case-insensitive) back to the real agent
    pub fn agent_for(&self, label: char) -> Option<&AgentId> {
        let label = label.to_ascii_uppercase();
        self.assignments
            .iter()
            .find(|a| a.label == label)
            .map(|a| &a.agent)
    }

    pub fn is_label(&self, label: char) -> bool {
        self.agent_for(label).is_some()
    }

    /// All assignments, ordered by label
    pub fn assignments(&self) -> &[LabelAssignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
