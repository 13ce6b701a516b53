//! Council run entity and its phase state machine

use crate::core::agent::AgentId;
use crate::core::error::DomainError;
use crate::core::question::Question;
use crate::core::request::RequestId;
use serde::{Deserialize, Serialize};

/// Phase of a council run
///
/// `Idle → RoundLoop(1..=R) → Ranking → Reporting → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouncilPhase {
    Idle,
    /// Refinement round in progress (1-indexed)
    RoundLoop(u32),
    Ranking,
    Reporting,
}

impl CouncilPhase {
    pub fn as_str(&self) -> &str {
        match self {
            CouncilPhase::Idle => "idle",
            CouncilPhase::RoundLoop(_) => "round_loop",
            CouncilPhase::Ranking => "ranking",
            CouncilPhase::Reporting => "reporting",
        }
    }
}

impl std::fmt::Display for CouncilPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouncilPhase::Idle => write!(f, "Idle"),
            CouncilPhase::RoundLoop(r) => write!(f, "Round {}", r),
            CouncilPhase::Ranking => write!(f, "Ranking"),
            CouncilPhase::Reporting => write!(f, "Reporting"),
        }
    }
}

/// Represents a single council request (Entity)
///
/// Tracks which phase the request is in and how many rounds have closed.
/// Phase changes only move forward; an out-of-order transition is a bug in
/// the caller and leaves the run unchanged.
#[derive(Debug, Clone)]
pub struct CouncilRun {
    id: RequestId,
    question: Question,
    agents: Vec<AgentId>,
    total_rounds: u32,
    phase: CouncilPhase,
    completed_rounds: u32,
}

impl CouncilRun {
    pub fn new(
        id: RequestId,
        question: Question,
        agents: Vec<AgentId>,
        total_rounds: u32,
    ) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }
        if total_rounds == 0 {
            return Err(DomainError::InvalidRounds(total_rounds));
        }
        Ok(Self {
            id,
            question,
            agents,
            total_rounds,
            phase: CouncilPhase::Idle,
            completed_rounds: 0,
        })
    }

    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn phase(&self) -> CouncilPhase {
        self.phase
    }

    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    /// Display names of every agent except `agent`
    pub fn others_of(&self, agent: &AgentId) -> Vec<String> {
        self.agents
            .iter()
            .filter(|a| *a != agent)
            .map(AgentId::display_name)
            .collect()
    }

    /// Enter the next refinement round, returning its number
    pub fn begin_round(&mut self) -> Option<u32> {
        let next = self.completed_rounds + 1;
        let allowed = match self.phase {
            CouncilPhase::Idle => next == 1,
            CouncilPhase::RoundLoop(r) => r == self.completed_rounds,
            _ => false,
        };
        if !allowed || next > self.total_rounds {
            return None;
        }
        self.phase = CouncilPhase::RoundLoop(next);
        Some(next)
    }

    /// Close the current round once every agent has resolved
    pub fn complete_round(&mut self) {
        if let CouncilPhase::RoundLoop(r) = self.phase
            && r == self.completed_rounds + 1
        {
            self.completed_rounds = r;
        }
    }

    pub fn begin_ranking(&mut self) -> bool {
        if self.completed_rounds == self.total_rounds
            && matches!(self.phase, CouncilPhase::RoundLoop(_))
        {
            self.phase = CouncilPhase::Ranking;
            true
        } else {
            false
        }
    }

    pub fn begin_reporting(&mut self) -> bool {
        if self.phase == CouncilPhase::Ranking {
            self.phase = CouncilPhase::Reporting;
            true
        } else {
            false
        }
    }

    /// Return to idle, either after reporting or on cancellation
    pub fn finish(&mut self) {
        self.phase = CouncilPhase::Idle;
    }
}
