//! Run Council use case
//!
//! Orchestrates the full council flow: `R` refinement rounds with a barrier
//! after each, then the anonymized ranking, then reporting to the sinks.

use crate::config::CouncilParams;
use crate::context::{CallContext, ContextError};
use crate::ports::agent_capability::CouncilAgent;
use crate::ports::broadcaster::{Broadcaster, NoBroadcast};
use crate::ports::metrics::{MetricsSink, NoMetrics};
use crate::ports::persistence::{ExportSink, PersistenceSink};
use crate::use_cases::ranking::RankingEngine;
use crate::use_cases::retry::RetryPolicy;
use crate::use_cases::round_executor::{CouncilState, RoundEnv, RoundExecutor};
use crate::use_cases::shared::Emitter;
use chrono::Utc;
use council_domain::ranking::MAX_LABELS;
use council_domain::{
    AgentId, CompletionStatus, CouncilEvent, CouncilOutcome, CouncilRun, CouncilSummary,
    DomainError, Question, RequestId, TokenUsage, winning_answer,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during a council run
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("No agents configured")]
    NoAgents,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Request {request_id} cancelled after {completed_rounds} completed round(s): {reason}")]
    Cancelled {
        request_id: RequestId,
        completed_rounds: u32,
        reason: ContextError,
    },
}

impl RunCouncilError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunCouncilError::Cancelled { .. })
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub question: Question,
    /// Council members in declaration order
    pub agents: Vec<CouncilAgent>,
    /// Use this id instead of generating one
    pub request_id: Option<RequestId>,
}

impl RunCouncilInput {
    pub fn new(question: Question, agents: Vec<CouncilAgent>) -> Self {
        Self {
            question,
            agents,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }
}

/// Use case for running a council request
pub struct RunCouncilUseCase {
    params: CouncilParams,
    executor: RoundExecutor,
    ranking: RankingEngine,
    metrics: Arc<dyn MetricsSink>,
    broadcaster: Arc<dyn Broadcaster>,
    persistence: Option<Arc<dyn PersistenceSink>>,
    export: Option<Arc<dyn ExportSink>>,
}

impl RunCouncilUseCase {
    pub fn new(params: CouncilParams) -> Self {
        Self {
            executor: RoundExecutor::new(RetryPolicy::new(params.retry.clone()), params.agent_timeout),
            ranking: RankingEngine::new(params.ranking_timeout, params.seed),
            params,
            metrics: Arc::new(NoMetrics),
            broadcaster: Arc::new(NoBroadcast),
            persistence: None,
            export: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceSink>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_export(mut self, export: Arc<dyn ExportSink>) -> Self {
        self.export = Some(export);
        self
    }

    pub fn params(&self) -> &CouncilParams {
        &self.params
    }

    fn validate(&self, input: &RunCouncilInput) -> Result<Vec<AgentId>, RunCouncilError> {
        if input.agents.is_empty() {
            return Err(RunCouncilError::NoAgents);
        }
        if input.agents.len() > MAX_LABELS {
            return Err(DomainError::TooManyAgents {
                count: input.agents.len(),
                max: MAX_LABELS,
            }
            .into());
        }
        let mut seen = HashSet::new();
        for agent in &input.agents {
            if !seen.insert(&agent.id) {
                return Err(DomainError::DuplicateAgent(agent.id.to_string()).into());
            }
        }
        Ok(input.agents.iter().map(|a| a.id.clone()).collect())
    }

    /// Execute the use case
    ///
    /// Per-agent failures never abort the request. Cancellation of `ctx`
    /// before ranking begins stops the run after the current round, writes a
    /// cancellation marker and returns [`RunCouncilError::Cancelled`].
    /// Cancellation during ranking still reports the (fallback) podium, but
    /// the completion marker says the vote was cut short.
    pub async fn execute(
        &self,
        ctx: &CallContext,
        input: RunCouncilInput,
    ) -> Result<CouncilOutcome, RunCouncilError> {
        let ids = self.validate(&input)?;
        let request_id = input.request_id.clone().unwrap_or_else(RequestId::generate);
        let mut run = CouncilRun::new(
            request_id.clone(),
            input.question.clone(),
            ids.clone(),
            self.params.rounds,
        )?;
        let started_at = Utc::now();
        let emitter = Emitter::new(&request_id, self.broadcaster.as_ref());

        info!(
            "Starting council {} with {} agents over {} rounds",
            request_id,
            ids.len(),
            self.params.rounds
        );
        self.metrics.begin_request(&request_id, &ids);
        emitter.emit(CouncilEvent::Clear);

        let env = RoundEnv {
            question: &input.question,
            agents: &input.agents,
            total_rounds: self.params.rounds,
            metrics: self.metrics.as_ref(),
            emitter: &emitter,
        };
        let mut state = CouncilState::new();
        let mut records = Vec::new();

        while let Some(round) = run.begin_round() {
            if let Some(reason) = ctx.error() {
                return Err(self.cancelled(&mut run, reason));
            }
            emitter.emit(CouncilEvent::RoundStart {
                round,
                total: self.params.rounds,
            });
            let round_records = self.executor.run_round(ctx, &env, round, &mut state).await;
            records.extend(round_records);

            if let Some(reason) = ctx.error() {
                return Err(self.cancelled(&mut run, reason));
            }
            run.complete_round();
        }

        run.begin_ranking();
        emitter.emit(CouncilEvent::RankingStart);
        let report = self
            .ranking
            .rank(ctx, &input.question, &state.replies, &input.agents, self.metrics.as_ref())
            .await?;
        let status = match ctx.error() {
            Some(reason) => {
                warn!("Council {} ranking interrupted: {}", request_id, reason);
                CompletionStatus::RankingCancelled
            }
            None => CompletionStatus::Completed,
        };

        run.begin_reporting();
        let podium = report.outcome.podium.clone();
        let answer = winning_answer(&ids, &podium, &state.replies);
        self.metrics.record_completion(&podium);
        emitter.emit(CouncilEvent::winner(&podium, answer.as_str()));
        info!(
            "Council {} finished: gold = [{}]",
            request_id,
            podium
                .gold
                .iter()
                .map(AgentId::display_name)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let tokens = CouncilSummary::tally_tokens(&ids, &records, &report.usage);
        let total_tokens = tokens.values().fold(TokenUsage::default(), |acc, t| acc + *t);
        let summary = CouncilSummary {
            request_id: request_id.clone(),
            question: input.question.content().to_string(),
            agents: ids,
            total_rounds: run.total_rounds(),
            completed_rounds: run.completed_rounds(),
            fallback_used: report.outcome.fallback_used,
            podium,
            winning_answer: answer,
            tokens,
            total_tokens,
            started_at,
            finished_at: Utc::now(),
        };

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save_request(&summary, &records) {
                warn!("Failed to persist council {}: {}", request_id, e);
            }
            if let Err(e) = persistence.mark_finished(&request_id, status) {
                warn!("Failed to mark council {} finished: {}", request_id, e);
            }
        }

        let outcome = CouncilOutcome {
            summary,
            records,
            ranking: report.outcome,
            discussion: state.discussion,
        };

        if let Some(export) = &self.export
            && let Err(e) = export.export(&outcome)
        {
            warn!("Failed to export council {}: {}", request_id, e);
        }

        run.finish();
        Ok(outcome)
    }

    /// Best-effort completion marker for a cancelled run
    fn cancelled(&self, run: &mut CouncilRun, reason: ContextError) -> RunCouncilError {
        let completed_rounds = run.completed_rounds();
        warn!(
            "Council {} cancelled ({}) after {} completed round(s)",
            run.id(),
            reason,
            completed_rounds
        );
        if let Some(persistence) = &self.persistence
            && let Err(e) =
                persistence.mark_finished(run.id(), CompletionStatus::Cancelled { completed_rounds })
        {
            warn!("Failed to mark council {} cancelled: {}", run.id(), e);
        }
        run.finish();
        RunCouncilError::Cancelled {
            request_id: run.id().clone(),
            completed_rounds,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::metrics::InMemoryMetrics;
    use crate::ports::agent_capability::{
        AgentCapability, AgentError, AgentResponse, Completion, PromptRequest, RankingRequest,
    };
    use crate::ports::broadcaster::ChannelBroadcaster;
    use crate::ports::persistence::SinkError;
    use async_trait::async_trait;
    use council_domain::{EventEnvelope, Reply, RoundRecord};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Agent answering "<name> r<round>" and ranking by a fixed preference
    struct Member {
        name: &'static str,
        preference: Vec<&'static str>,
        prompts: AtomicU32,
        ranks: AtomicU32,
        fail_rounds: Vec<u32>,
        /// Sleep this long in every prompt call
        delay: Duration,
        /// Sleep this long in every ranking call
        rank_delay: Duration,
    }

    impl Member {
        fn new(name: &'static str, preference: Vec<&'static str>) -> Self {
            Self {
                name,
                preference,
                prompts: AtomicU32::new(0),
                ranks: AtomicU32::new(0),
                fail_rounds: Vec::new(),
                delay: Duration::ZERO,
                rank_delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl AgentCapability for Member {
        async fn prompt(
            &self,
            _ctx: &CallContext,
            request: &PromptRequest,
        ) -> Result<AgentResponse, AgentError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail_rounds.contains(&request.meta.round) {
                return Err(AgentError::Request("scripted failure".into()));
            }
            let answer = format!("{} r{}", self.name, request.meta.round);
            Ok(AgentResponse::new(Reply::new(answer), TokenUsage::new(10, 2)))
        }

        async fn rank(
            &self,
            _ctx: &CallContext,
            request: &RankingRequest,
        ) -> Result<Completion, AgentError> {
            self.ranks.fetch_add(1, Ordering::SeqCst);
            if !self.rank_delay.is_zero() {
                tokio::time::sleep(self.rank_delay).await;
            }
            let mut text = String::from("Ranking:\n");
            for preferred in &self.preference {
                if let Some((label, _)) = request
                    .answers
                    .iter()
                    .find(|(_, a)| a.starts_with(&format!("{} ", preferred)))
                {
                    text.push_str(&format!("{}\n", label));
                }
            }
            Ok(Completion::new(text, TokenUsage::new(20, 1)))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(CouncilSummary, usize)>>,
        markers: Mutex<Vec<CompletionStatus>>,
        exported: Mutex<u32>,
    }

    impl PersistenceSink for RecordingSink {
        fn save_request(
            &self,
            summary: &CouncilSummary,
            records: &[RoundRecord],
        ) -> Result<(), SinkError> {
            self.saved
                .lock()
                .unwrap()
                .push((summary.clone(), records.len()));
            Ok(())
        }

        fn mark_finished(
            &self,
            _request_id: &RequestId,
            status: CompletionStatus,
        ) -> Result<(), SinkError> {
            self.markers.lock().unwrap().push(status);
            Ok(())
        }
    }

    impl ExportSink for RecordingSink {
        fn export(&self, _outcome: &CouncilOutcome) -> Result<(), SinkError> {
            *self.exported.lock().unwrap() += 1;
            Err(SinkError::Io(std::io::Error::other("disk full")))
        }
    }

    fn params(rounds: u32) -> CouncilParams {
        CouncilParams::default()
            .with_rounds(rounds)
            .with_seed(11)
            .with_retry(RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(10),
                max_delay: Duration::from_millis(10),
                multiplier: 1.0,
            })
    }

    fn council(members: &[Arc<Member>]) -> Vec<CouncilAgent> {
        members
            .iter()
            .map(|m| CouncilAgent::new(AgentId::new("test", m.name), m.clone()))
            .collect()
    }

    fn events(rx: &mut tokio::sync::broadcast::Receiver<EventEnvelope>) -> Vec<CouncilEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            events.push(envelope.event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_call_counts_and_events() {
        let members = vec![
            Arc::new(Member::new("x", vec!["x", "y", "z"])),
            Arc::new(Member::new("y", vec!["y", "x", "z"])),
            Arc::new(Member::new("z", vec!["x", "z", "y"])),
        ];
        let channel = Arc::new(ChannelBroadcaster::new(64));
        let mut rx = channel.subscribe();
        let metrics = Arc::new(InMemoryMetrics::new());
        let sink = Arc::new(RecordingSink::default());
        let use_case = RunCouncilUseCase::new(params(2))
            .with_broadcaster(channel.clone())
            .with_metrics(metrics.clone())
            .with_persistence(sink.clone())
            .with_export(sink.clone());

        let input = RunCouncilInput::new(Question::new("Q?").unwrap(), council(&members))
            .with_request_id(RequestId::new("req-1"));
        let outcome = use_case.execute(&CallContext::new(), input).await.unwrap();

        for member in &members {
            assert_eq!(member.prompts.load(Ordering::SeqCst), 2);
            assert_eq!(member.ranks.load(Ordering::SeqCst), 1);
        }

        let x = AgentId::new("test", "x");
        assert_eq!(outcome.summary.podium.gold, vec![x.clone()]);
        assert_eq!(outcome.summary.winning_answer, "x r2");
        assert_eq!(outcome.summary.completed_rounds, 2);
        assert_eq!(outcome.records.len(), 6);
        assert_eq!(outcome.summary.tokens[&x], TokenUsage::new(40, 5));
        assert_eq!(outcome.summary.total_tokens, TokenUsage::new(120, 15));

        let kinds: Vec<&str> = events(&mut rx).iter().map(CouncilEvent::kind).collect();
        assert_eq!(kinds.first(), Some(&"clear"));
        assert_eq!(kinds.iter().filter(|k| **k == "round_start").count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == "response").count(), 6);
        assert_eq!(kinds[kinds.len() - 2], "ranking_start");
        assert_eq!(kinds.last(), Some(&"winner"));

        assert_eq!(metrics.winners(), vec![x]);
        assert_eq!(sink.saved.lock().unwrap()[0].1, 6);
        assert_eq!(*sink.markers.lock().unwrap(), vec![CompletionStatus::Completed]);
        // export failure is logged, not fatal
        assert_eq!(*sink.exported.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent_failures_do_not_abort() {
        let mut flaky = Member::new("y", vec!["y"]);
        flaky.fail_rounds = vec![2];
        let members = vec![Arc::new(Member::new("x", vec!["x"])), Arc::new(flaky)];
        let channel = Arc::new(ChannelBroadcaster::new(64));
        let mut rx = channel.subscribe();
        let use_case = RunCouncilUseCase::new(params(2)).with_broadcaster(channel.clone());

        let outcome = use_case
            .execute(
                &CallContext::new(),
                RunCouncilInput::new(Question::new("Q?").unwrap(), council(&members)),
            )
            .await
            .unwrap();

        // y kept its round 1 answer
        let y = AgentId::new("test", "y");
        assert_eq!(outcome.records.iter().filter(|r| !r.is_success()).count(), 1);
        assert_eq!(members[1].prompts.load(Ordering::SeqCst), 3);

        let events = events(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            CouncilEvent::Error { model, round: 2, .. } if *model == y
        )));
        // x and y each voted for themselves: tie for gold
        assert_eq!(outcome.summary.podium.gold.len(), 2);
        assert_eq!(outcome.summary.winning_answer, "x r2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_rounds_and_marks_persistence() {
        let mut slow = Member::new("x", vec!["x"]);
        slow.delay = Duration::from_secs(10);
        let members = vec![Arc::new(slow)];
        let sink = Arc::new(RecordingSink::default());
        let use_case = RunCouncilUseCase::new(params(3)).with_persistence(sink.clone());

        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            // inside round 2
            tokio::time::sleep(Duration::from_secs(15)).await;
            canceller.cancel();
        });

        let err = use_case
            .execute(
                &ctx,
                RunCouncilInput::new(Question::new("Q?").unwrap(), council(&members)),
            )
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(matches!(
            err,
            RunCouncilError::Cancelled {
                completed_rounds: 1,
                reason: ContextError::Cancelled,
                ..
            }
        ));
        assert_eq!(members[0].prompts.load(Ordering::SeqCst), 2);
        assert_eq!(members[0].ranks.load(Ordering::SeqCst), 0);
        assert!(sink.saved.lock().unwrap().is_empty());
        assert_eq!(
            *sink.markers.lock().unwrap(),
            vec![CompletionStatus::Cancelled { completed_rounds: 1 }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_ranking_is_marked() {
        let mut slow_judge = Member::new("x", vec!["x"]);
        slow_judge.rank_delay = Duration::from_secs(10);
        let members = vec![Arc::new(slow_judge)];
        let sink = Arc::new(RecordingSink::default());
        let use_case = RunCouncilUseCase::new(params(1)).with_persistence(sink.clone());

        let ctx = CallContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });

        let outcome = use_case
            .execute(
                &ctx,
                RunCouncilInput::new(Question::new("Q?").unwrap(), council(&members)),
            )
            .await
            .unwrap();

        assert!(outcome.summary.fallback_used);
        assert_eq!(outcome.summary.completed_rounds, 1);
        assert_eq!(outcome.ranking.abstentions.len(), 1);
        assert_eq!(sink.saved.lock().unwrap().len(), 1);
        assert_eq!(
            *sink.markers.lock().unwrap(),
            vec![CompletionStatus::RankingCancelled]
        );
    }

    #[tokio::test]
    async fn test_rejects_invalid_councils() {
        let use_case = RunCouncilUseCase::new(params(1));
        let question = Question::new("Q?").unwrap();

        let err = use_case
            .execute(&CallContext::new(), RunCouncilInput::new(question.clone(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, RunCouncilError::NoAgents));

        let twin = Arc::new(Member::new("x", vec![]));
        let err = use_case
            .execute(
                &CallContext::new(),
                RunCouncilInput::new(question.clone(), council(&[twin.clone(), twin])),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunCouncilError::InvalidInput(DomainError::DuplicateAgent(_))
        ));

        let zero_rounds = RunCouncilUseCase::new(params(0));
        let err = zero_rounds
            .execute(
                &CallContext::new(),
                RunCouncilInput::new(question, council(&[Arc::new(Member::new("x", vec![]))])),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunCouncilError::InvalidInput(DomainError::InvalidRounds(0))
        ));
    }
}
