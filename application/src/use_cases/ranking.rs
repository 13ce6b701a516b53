//! Ranking engine
//!
//! Anonymizes the council, asks every agent (in parallel, one attempt each)
//! to order the final answers, decodes the ballots and aggregates them with a
//! Borda count. Unparseable responses and failed calls are abstentions; with
//! no ballot at all the fallback winner rule applies.

use crate::context::CallContext;
use crate::ports::agent_capability::{AgentError, Completion, CouncilAgent, RankingRequest};
use crate::ports::metrics::MetricsSink;
use crate::use_cases::shared::panic_message;
use council_domain::ranking::{borda_scores, decode_ballot};
use council_domain::{
    Abstention, AgentId, AnonymizationMap, DomainError, LatestReplies, Podium, PromptTemplate,
    Question, RankingOutcome, TokenUsage,
};
use futures::FutureExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Ranking outcome plus the tokens each judge spent
#[derive(Debug, Clone)]
pub struct RankingReport {
    pub outcome: RankingOutcome,
    pub usage: BTreeMap<AgentId, TokenUsage>,
}

/// Runs the anonymized peer vote
pub struct RankingEngine {
    rng: Mutex<StdRng>,
    timeout: Duration,
}

impl RankingEngine {
    /// `seed` makes label assignment reproducible; `None` seeds from entropy
    pub fn new(timeout: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            timeout,
        }
    }

    fn assign_labels(&self, ids: &[AgentId]) -> Result<AnonymizationMap, DomainError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        AnonymizationMap::new(ids, &mut *rng)
    }

    /// Rank the latest replies of `agents`
    pub async fn rank(
        &self,
        ctx: &CallContext,
        question: &Question,
        replies: &LatestReplies,
        agents: &[CouncilAgent],
        metrics: &dyn MetricsSink,
    ) -> Result<RankingReport, DomainError> {
        let ids: Vec<AgentId> = agents.iter().map(|a| a.id.clone()).collect();
        let labels = self.assign_labels(&ids)?;

        // Only agents with an answer are shown; everyone still votes
        let answers: Vec<(char, String)> = labels
            .assignments()
            .iter()
            .filter_map(|a| replies.answer_of(&a.agent).map(|ans| (a.label, ans.to_string())))
            .collect();

        let mut usage = BTreeMap::new();
        let mut ballots = Vec::new();
        let mut abstentions = Vec::new();

        if answers.is_empty() {
            warn!("No agent produced an answer; skipping the vote");
            abstentions.extend(
                ids.iter()
                    .map(|id| Abstention::new(id.clone(), "no answers to rank")),
            );
        } else {
            let shown: Vec<(char, &str)> = answers.iter().map(|(l, a)| (*l, a.as_str())).collect();
            let request = Arc::new(RankingRequest {
                system: PromptTemplate::ranking_system().to_string(),
                prompt: PromptTemplate::ranking_prompt(question.content(), &shown),
                answers: answers.clone(),
            });
            let shown_labels: Vec<char> = answers.iter().map(|(label, _)| *label).collect();
            info!("Ranking: {} judges, {} answers", agents.len(), answers.len());

            let mut join_set = JoinSet::new();
            for (index, agent) in agents.iter().enumerate() {
                let capability = Arc::clone(&agent.capability);
                let call_ctx = ctx.with_timeout(agent.timeout.unwrap_or(self.timeout));
                let request = Arc::clone(&request);

                join_set.spawn(async move {
                    let started = Instant::now();
                    let call = call_ctx.run(capability.rank(&call_ctx, &request));
                    let result: Result<Completion, AgentError> =
                        match AssertUnwindSafe(call).catch_unwind().await {
                            Ok(Ok(result)) => result,
                            Ok(Err(reason)) => Err(AgentError::Context(reason)),
                            Err(payload) => {
                                Err(AgentError::Panicked(panic_message(payload.as_ref())))
                            }
                        };
                    (index, result, started.elapsed())
                });
            }

            let mut results: Vec<Option<Result<Completion, AgentError>>> =
                (0..agents.len()).map(|_| None).collect();
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((index, result, duration)) => {
                        if let Ok(completion) = &result {
                            metrics.record_ranking(&ids[index], duration, completion.usage);
                        }
                        results[index] = Some(result);
                    }
                    Err(e) => warn!("Ranking worker join error: {}", e),
                }
            }

            // Declaration order from here on
            for (voter, result) in ids.iter().zip(results) {
                match result {
                    Some(Ok(completion)) => {
                        usage.insert(voter.clone(), completion.usage);
                        match decode_ballot(voter, &completion.text, &labels, &shown_labels) {
                            Ok(ballot) => {
                                debug!("{} ranked {} answers", voter, ballot.ranking.len());
                                ballots.push(ballot);
                            }
                            Err(rejected) => {
                                warn!("Discarding ballot from {}: {}", voter, rejected);
                                abstentions.push(Abstention::new(voter.clone(), rejected.to_string()));
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!("{} failed to rank: {}", voter, e);
                        abstentions.push(Abstention::new(voter.clone(), e.to_string()));
                    }
                    None => {
                        abstentions.push(Abstention::new(voter.clone(), "worker task failed"));
                    }
                }
            }
        }

        let scores = borda_scores(&ids, &ballots);
        let fallback_used = ballots.is_empty();
        let podium = if fallback_used {
            warn!("No valid ballots; using fallback winner");
            Podium::fallback(&ids, replies)
        } else {
            Podium::from_scores(&scores)
        };

        Ok(RankingReport {
            outcome: RankingOutcome {
                labels,
                ballots,
                abstentions,
                scores,
                podium,
                fallback_used,
            },
            usage,
        })
    }
}
