//! Metrics sink port

use council_domain::{AgentId, Podium, RequestId, RoundRecord, TokenUsage};
use std::time::Duration;

/// Receives per-agent measurements while a request runs
///
/// Called concurrently from agent workers; implementations must keep each
/// agent's record separate.
pub trait MetricsSink: Send + Sync {
    /// A request started with this agent set
    fn begin_request(&self, request_id: &RequestId, agents: &[AgentId]);

    /// One agent finished a refinement round (success or final failure)
    fn record_round(&self, record: &RoundRecord);

    /// One agent answered the ranking request
    fn record_ranking(&self, agent: &AgentId, duration: Duration, usage: TokenUsage);

    /// The request produced its winners
    fn record_completion(&self, podium: &Podium);
}

/// No-op metrics sink
pub struct NoMetrics;

impl MetricsSink for NoMetrics {
    fn begin_request(&self, _request_id: &RequestId, _agents: &[AgentId]) {}
    fn record_round(&self, _record: &RoundRecord) {}
    fn record_ranking(&self, _agent: &AgentId, _duration: Duration, _usage: TokenUsage) {}
    fn record_completion(&self, _podium: &Podium) {}
}
