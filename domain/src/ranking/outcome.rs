//! Result of one anonymized ranking pass.

use super::anonymize::AnonymizationMap;
use super::ballot::Ballot;
use super::borda::{AgentScore, Podium};
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// A voter whose ranking response did not yield a ballot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abstention {
    pub voter: AgentId,
    pub reason: String,
}

impl Abstention {
    pub fn new(voter: AgentId, reason: impl Into<String>) -> Self {
        Self {
            voter,
            reason: reason.into(),
        }
    }
}

/// Everything the ranking pass produced, kept for reporting and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub labels: AnonymizationMap,
    pub ballots: Vec<Ballot>,
    pub abstentions: Vec<Abstention>,
    /// Borda scores in declaration order
    pub scores: Vec<AgentScore>,
    pub podium: Podium,
    /// True when no ballot was valid and the podium came from the fallback rule
    pub fallback_used: bool,
}

impl RankingOutcome {
    pub fn score_of(&self, agent: &AgentId) -> Option<u32> {
        self.scores
            .iter()
            .find(|s| &s.agent == agent)
            .map(|s| s.points)
    }

    pub fn ballot_of(&self, voter: &AgentId) -> Option<&Ballot> {
        self.ballots.iter().find(|b| &b.voter == voter)
    }

    /// Scores sorted best first; ties keep declaration order
    pub fn leaderboard(&self) -> Vec<&AgentScore> {
        let mut sorted: Vec<&AgentScore> = self.scores.iter().collect();
        sorted.sort_by(|a, b| b.points.cmp(&a.points));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::borda::borda_scores;

    #[test]
    fn test_leaderboard_is_stable() {
        let agents: Vec<AgentId> = ["a", "b", "c"]
            .iter()
            .map(|v| AgentId::new("f", *v))
            .collect();
        let ballots = vec![Ballot::new(
            agents[0].clone(),
            vec![agents[2].clone()],
        )];
        let scores = borda_scores(&agents, &ballots);
        let outcome = RankingOutcome {
            labels: AnonymizationMap::sequential(&agents).unwrap(),
            podium: Podium::from_scores(&scores),
            ballots,
            abstentions: vec![Abstention::new(agents[1].clone(), "no labels")],
            scores,
            fallback_used: false,
        };

        let order: Vec<&str> = outcome
            .leaderboard()
            .iter()
            .map(|s| s.agent.variant())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(outcome.score_of(&agents[2]), Some(3));
        assert!(outcome.ballot_of(&agents[0]).is_some());
        assert!(outcome.ballot_of(&agents[1]).is_none());
    }
}
