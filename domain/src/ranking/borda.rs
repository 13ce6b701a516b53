//! Borda count aggregation and tie-aware podium tiers.

use super::ballot::Ballot;
use crate::core::agent::AgentId;
use crate::round::ledger::LatestReplies;
use serde::{Deserialize, Serialize};

/// Aggregate Borda score of one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentScore {
    pub agent: AgentId,
    pub points: u32,
    /// Number of ballots that placed this agent first
    pub first_places: u32,
}

/// Sum Borda points over all valid ballots
///
/// With `n` active agents a ballot awards `n` points to its first entry,
/// `n - 1` to the second, and so on; agents a ballot leaves out get nothing
/// from it. Every active agent gets a score (possibly zero). The result is in
/// declaration order.
///
/// # Example
///
/// ```
/// use council_domain::{AgentId, Ballot};
/// use council_domain::ranking::borda_scores;
///
/// let x = AgentId::new("f", "x");
/// let y = AgentId::new("f", "y");
/// let agents = vec![x.clone(), y.clone()];
/// let ballots = vec![
///     Ballot::new(x.clone(), vec![x.clone(), y.clone()]),
///     Ballot::new(y.clone(), vec![x.clone()]),
/// ];
///
/// let scores = borda_scores(&agents, &ballots);
/// assert_eq!(scores[0].points, 4);
/// assert_eq!(scores[1].points, 1);
/// ```
pub fn borda_scores(agents: &[AgentId], ballots: &[Ballot]) -> Vec<AgentScore> {
    let n = agents.len() as u32;
    let mut scores: Vec<AgentScore> = agents
        .iter()
        .map(|agent| AgentScore {
            agent: agent.clone(),
            points: 0,
            first_places: 0,
        })
        .collect();

    for ballot in ballots {
        let ranked = ballot.ranking.iter().filter(|a| agents.contains(a));
        for (position, agent) in ranked.enumerate() {
            if let Some(score) = scores.iter_mut().find(|s| &s.agent == agent) {
                score.points += n.saturating_sub(position as u32);
                if position == 0 {
                    score.first_places += 1;
                }
            }
        }
    }

    scores
}

/// Podium place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Gold,
    Silver,
    Bronze,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Gold => write!(f, "Gold"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Bronze => write!(f, "Bronze"),
        }
    }
}

/// Winner tiers; each tier is a set so ties stay together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podium {
    pub gold: Vec<AgentId>,
    pub silver: Vec<AgentId>,
    pub bronze: Vec<AgentId>,
}

impl Podium {
    /// Gold takes every agent sharing the top score, silver every agent
    /// sharing the next distinct score, bronze the one after that
    ///
    /// Tier members keep the order of `scores`.
    pub fn from_scores(scores: &[AgentScore]) -> Self {
        let mut levels: Vec<u32> = scores.iter().map(|s| s.points).collect();
        levels.sort_unstable_by(|a, b| b.cmp(a));
        levels.dedup();

        let tier = |index: usize| -> Vec<AgentId> {
            levels
                .get(index)
                .map(|level| {
                    scores
                        .iter()
                        .filter(|s| s.points == *level)
                        .map(|s| s.agent.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            gold: tier(0),
            silver: tier(1),
            bronze: tier(2),
        }
    }

    /// Winner when no ballot could be decoded
    ///
    /// Gold goes to the first agent (declaration order) holding a final reply;
    /// if nobody replied, to the first agent. Silver and bronze stay empty.
    pub fn fallback(agents: &[AgentId], replies: &LatestReplies) -> Self {
        let winner = agents
            .iter()
            .find(|a| replies.contains(a))
            .or_else(|| agents.first());

        Self {
            gold: winner.cloned().into_iter().collect(),
            silver: Vec::new(),
            bronze: Vec::new(),
        }
    }

    pub fn tier_of(&self, agent: &AgentId) -> Option<Tier> {
        if self.gold.contains(agent) {
            Some(Tier::Gold)
        } else if self.silver.contains(agent) {
            Some(Tier::Silver)
        } else if self.bronze.contains(agent) {
            Some(Tier::Bronze)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gold.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::reply::Reply;

    fn xyz() -> (AgentId, AgentId, AgentId) {
        (
            AgentId::new("f", "x"),
            AgentId::new("f", "y"),
            AgentId::new("f", "z"),
        )
    }

    fn points(scores: &[AgentScore]) -> Vec<u32> {
        scores.iter().map(|s| s.points).collect()
    }

    #[test]
    fn test_borda_three_agents() {
        let (x, y, z) = xyz();
        let agents = vec![x.clone(), y.clone(), z.clone()];
        let ballots = vec![
            Ballot::new(x.clone(), vec![x.clone(), y.clone(), z.clone()]),
            Ballot::new(y.clone(), vec![y.clone(), x.clone(), z.clone()]),
            Ballot::new(z.clone(), vec![x.clone(), z.clone(), y.clone()]),
        ];

        let scores = borda_scores(&agents, &ballots);
        assert_eq!(points(&scores), vec![8, 6, 4]);
        assert_eq!(scores[0].first_places, 2);

        let podium = Podium::from_scores(&scores);
        assert_eq!(podium.gold, vec![x.clone()]);
        assert_eq!(podium.silver, vec![y.clone()]);
        assert_eq!(podium.bronze, vec![z.clone()]);
        assert_eq!(podium.tier_of(&y), Some(Tier::Silver));
    }

    #[test]
    fn test_tie_for_gold() {
        let (x, y, z) = xyz();
        let agents = vec![x.clone(), y.clone(), z.clone()];
        let ballots = vec![
            Ballot::new(x.clone(), vec![x.clone(), y.clone(), z.clone()]),
            Ballot::new(y.clone(), vec![y.clone(), x.clone(), z.clone()]),
        ];

        let scores = borda_scores(&agents, &ballots);
        assert_eq!(points(&scores), vec![5, 5, 2]);

        let podium = Podium::from_scores(&scores);
        assert_eq!(podium.gold, vec![x, y]);
        assert_eq!(podium.silver, vec![z]);
        assert!(podium.bronze.is_empty());
    }

    #[test]
    fn test_omitted_agents_score_zero() {
        let (x, y, z) = xyz();
        let agents = vec![x.clone(), y.clone(), z.clone()];
        let ballots = vec![Ballot::new(x.clone(), vec![y.clone()])];

        let scores = borda_scores(&agents, &ballots);
        assert_eq!(points(&scores), vec![0, 3, 0]);

        let podium = Podium::from_scores(&scores);
        assert_eq!(podium.gold, vec![y]);
        assert_eq!(podium.silver, vec![x, z]);
        assert!(podium.bronze.is_empty());
    }

    #[test]
    fn test_inactive_agents_ignored() {
        let (x, y, z) = xyz();
        let agents = vec![x.clone(), y.clone()];
        // z is not in the active set and does not shift positions
        let ballots = vec![Ballot::new(x.clone(), vec![z, y.clone(), x.clone()])];

        let scores = borda_scores(&agents, &ballots);
        assert_eq!(points(&scores), vec![1, 2]);
    }

    #[test]
    fn test_four_distinct_levels() {
        let agents: Vec<AgentId> = ["a", "b", "c", "d"]
            .iter()
            .map(|v| AgentId::new("f", *v))
            .collect();
        let ballots = vec![Ballot::new(agents[0].clone(), agents.clone())];

        let podium = Podium::from_scores(&borda_scores(&agents, &ballots));
        assert_eq!(podium.gold, vec![agents[0].clone()]);
        assert_eq!(podium.silver, vec![agents[1].clone()]);
        assert_eq!(podium.bronze, vec![agents[2].clone()]);
        assert_eq!(podium.tier_of(&agents[3]), None);
    }

    #[test]
    fn test_fallback_prefers_first_replier() {
        let (x, y, z) = xyz();
        let agents = vec![x, y.clone(), z.clone()];
        let mut replies = LatestReplies::new();
        replies.record(z, 3, Reply::new("late"));
        replies.record(y.clone(), 3, Reply::new("early"));

        let podium = Podium::fallback(&agents, &replies);
        assert_eq!(podium.gold, vec![y]);
        assert!(podium.silver.is_empty());
        assert!(podium.bronze.is_empty());
    }

    #[test]
    fn test_fallback_without_replies() {
        let (x, y, _) = xyz();
        let podium = Podium::fallback(&[x.clone(), y], &LatestReplies::new());
        assert_eq!(podium.gold, vec![x]);
        assert!(Podium::fallback(&[], &LatestReplies::new()).is_empty());
    }
}
