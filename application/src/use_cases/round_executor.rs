//! Round executor
//!
//! Fans one refinement round out to every agent in parallel and waits for all
//! of them (success or final failure) before anything is merged. Workers never
//! touch shared state: each returns its result to the join loop, and the
//! merge into [`CouncilState`] happens once, after the barrier, in declaration
//! order. Every agent in round `r` therefore sees exactly the state left by
//! round `r - 1`.

use crate::context::CallContext;
use crate::ports::agent_capability::{
    AgentCapability, AgentError, AgentResponse, CouncilAgent, PromptRequest,
};
use crate::ports::metrics::MetricsSink;
use crate::use_cases::retry::RetryPolicy;
use crate::use_cases::shared::{Emitter, panic_message};
use council_domain::{
    AgentId, CouncilEvent, DiscussionState, LatestReplies, Question, RoundMeta, RoundRecord,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Conversation state carried between rounds
#[derive(Debug, Clone, Default)]
pub struct CouncilState {
    pub replies: LatestReplies,
    pub discussion: DiscussionState,
}

impl CouncilState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prompt payload for `agent`, built from the current (frozen) state
    fn prompt_request(
        &self,
        question: &Question,
        agent: &AgentId,
        ids: &[AgentId],
        round: u32,
        total_rounds: u32,
    ) -> PromptRequest {
        PromptRequest {
            question: question.clone(),
            meta: RoundMeta {
                round,
                total_rounds,
                other_agents: ids
                    .iter()
                    .filter(|a| *a != agent)
                    .map(AgentId::display_name)
                    .collect(),
            },
            replies: self
                .replies
                .in_order(ids)
                .map(|(id, reply)| (id.clone(), reply.clone()))
                .collect(),
            threads: self.discussion.threads_of(agent),
        }
    }

    /// Apply one agent's successful reply
    fn merge(&mut self, agent: &AgentId, round: u32, response: &AgentResponse, ids: &[AgentId]) {
        let report = self
            .discussion
            .merge_reply(agent, &response.reply, round, ids);
        for unresolved in &report.unresolved {
            warn!("Dropping discussion message from {}: {}", agent, unresolved);
        }
        if !report.delivered.is_empty() {
            debug!(
                "{} addressed {} agent(s) in round {}",
                agent,
                report.delivered.len(),
                round
            );
        }
        self.replies.record(agent.clone(), round, response.reply.clone());
    }
}

/// Inputs that stay fixed for every round of a request
#[derive(Clone, Copy)]
pub struct RoundEnv<'a> {
    pub question: &'a Question,
    pub agents: &'a [CouncilAgent],
    pub total_rounds: u32,
    pub metrics: &'a dyn MetricsSink,
    pub emitter: &'a Emitter<'a>,
}

/// What one worker sends back to the join loop
struct WorkerResult {
    index: usize,
    result: Result<AgentResponse, AgentError>,
    duration: Duration,
    attempts: u32,
}

/// Runs one round across all agents
#[derive(Debug, Clone)]
pub struct RoundExecutor {
    retry: RetryPolicy,
    default_timeout: Duration,
}

impl RoundExecutor {
    pub fn new(retry: RetryPolicy, default_timeout: Duration) -> Self {
        Self {
            retry,
            default_timeout,
        }
    }

    /// Execute round `round` and merge its results into `state`
    ///
    /// Returns one record per agent, in declaration order.
    pub async fn run_round(
        &self,
        ctx: &CallContext,
        env: &RoundEnv<'_>,
        round: u32,
        state: &mut CouncilState,
    ) -> Vec<RoundRecord> {
        let RoundEnv {
            question,
            agents,
            total_rounds,
            metrics,
            emitter,
        } = *env;
        let ids: Vec<AgentId> = agents.iter().map(|a| a.id.clone()).collect();
        info!("Round {}/{}: querying {} agents", round, total_rounds, agents.len());

        let mut join_set = JoinSet::new();
        for (index, agent) in agents.iter().enumerate() {
            let request = Arc::new(state.prompt_request(question, &agent.id, &ids, round, total_rounds));
            let capability = Arc::clone(&agent.capability);
            let call_ctx = ctx.with_timeout(agent.timeout.unwrap_or(self.default_timeout));
            let retry = self.retry.clone();

            join_set.spawn(async move {
                let started = Instant::now();
                let mut attempts = 0;
                let outcome = AssertUnwindSafe(retry.execute(&call_ctx, |_| {
                    attempts += 1;
                    call_agent(Arc::clone(&capability), call_ctx.clone(), Arc::clone(&request))
                }))
                .catch_unwind()
                .await;

                let result = match outcome {
                    Ok(result) => result,
                    Err(payload) => Err(AgentError::Panicked(panic_message(payload.as_ref()))),
                };
                WorkerResult {
                    index,
                    result,
                    duration: started.elapsed(),
                    attempts,
                }
            });
        }

        // Barrier: collect every worker before merging anything
        let mut results: Vec<Option<(Option<AgentResponse>, RoundRecord)>> =
            (0..agents.len()).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let worker = match joined {
                Ok(worker) => worker,
                Err(e) => {
                    warn!("Round {} worker join error: {}", round, e);
                    continue;
                }
            };
            let agent = &ids[worker.index];
            match &worker.result {
                Ok(response) => {
                    debug!(
                        "{} answered round {} in {:?} ({} attempt(s))",
                        agent, round, worker.duration, worker.attempts
                    );
                    emitter.emit(CouncilEvent::response(
                        agent,
                        round,
                        &response.reply,
                        response.usage,
                    ));
                }
                Err(e) => {
                    warn!("{} failed round {}: {}", agent, round, e);
                    emitter.emit(CouncilEvent::error(agent, round, e.to_string()));
                }
            }
            let record = to_record(round, agent, &worker);
            metrics.record_round(&record);
            results[worker.index] = Some((worker.result.ok(), record));
        }

        let mut records = Vec::with_capacity(agents.len());
        for (index, slot) in results.into_iter().enumerate() {
            let agent = &ids[index];
            match slot {
                Some((response, record)) => {
                    if let Some(response) = &response {
                        state.merge(agent, round, response, &ids);
                    }
                    records.push(record);
                }
                None => {
                    let record =
                        RoundRecord::failure(round, agent.clone(), "worker task failed", 0, 0);
                    metrics.record_round(&record);
                    emitter.emit(CouncilEvent::error(agent, round, "worker task failed"));
                    records.push(record);
                }
            }
        }

        let answered = records.iter().filter(|r| r.is_success()).count();
        info!(
            "Round {}/{} complete: {}/{} agents answered",
            round,
            total_rounds,
            answered,
            agents.len()
        );
        records
    }
}

/// One attempt: the agent call, abandoned if the call context finishes first
async fn call_agent(
    capability: Arc<dyn AgentCapability>,
    ctx: CallContext,
    request: Arc<PromptRequest>,
) -> Result<AgentResponse, AgentError> {
    match ctx.run(capability.prompt(&ctx, &request)).await {
        Ok(result) => result,
        Err(reason) => Err(AgentError::Context(reason)),
    }
}

fn to_record(round: u32, agent: &AgentId, worker: &WorkerResult) -> RoundRecord {
    let duration_ms = worker.duration.as_millis() as u64;
    match &worker.result {
        Ok(response) => RoundRecord::success(
            round,
            agent.clone(),
            response.reply.clone(),
            response.usage,
            duration_ms,
            worker.attempts,
        ),
        Err(e) => RoundRecord::failure(round, agent.clone(), e.to_string(), duration_ms, worker.attempts),
    }
}
