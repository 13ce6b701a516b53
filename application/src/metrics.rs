//! In-memory metrics tracker.
//!
//! Each agent gets its own `Mutex`-guarded record when a request begins, so
//! concurrent workers only ever contend on their own agent's lock.

use crate::ports::metrics::MetricsSink;
use council_domain::{AgentId, Podium, RequestId, RoundRecord, TokenUsage};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::debug;

/// Accumulated measurements of one agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentMetrics {
    pub rounds_succeeded: u32,
    pub rounds_failed: u32,
    /// Agent calls made during refinement, including retries
    pub attempts: u32,
    pub round_time_ms: u64,
    pub round_tokens: TokenUsage,
    pub ranking_time_ms: u64,
    pub ranking_tokens: TokenUsage,
    pub last_error: Option<String>,
}

impl AgentMetrics {
    pub fn total_tokens(&self) -> TokenUsage {
        self.round_tokens + self.ranking_tokens
    }
}

/// Metrics sink that keeps everything in memory for reporting
#[derive(Default)]
pub struct InMemoryMetrics {
    request_id: Mutex<Option<RequestId>>,
    agents: RwLock<HashMap<AgentId, Arc<Mutex<AgentMetrics>>>>,
    winners: Mutex<Vec<AgentId>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_agent(&self, agent: &AgentId, update: impl FnOnce(&mut AgentMetrics)) {
        let record = match self.agents.read() {
            Ok(agents) => agents.get(agent).cloned(),
            Err(_) => None,
        };
        match record {
            Some(record) => {
                if let Ok(mut metrics) = record.lock() {
                    update(&mut metrics);
                }
            }
            None => debug!("Ignoring metrics for unregistered agent {}", agent),
        }
    }

    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id.lock().ok().and_then(|id| id.clone())
    }

    /// Copy of one agent's record
    pub fn snapshot(&self, agent: &AgentId) -> Option<AgentMetrics> {
        let agents = self.agents.read().ok()?;
        let record = agents.get(agent)?;
        record.lock().ok().map(|m| m.clone())
    }

    /// Copy of every agent's record, sorted by agent
    pub fn snapshot_all(&self) -> BTreeMap<AgentId, AgentMetrics> {
        let Ok(agents) = self.agents.read() else {
            return BTreeMap::new();
        };
        agents
            .iter()
            .filter_map(|(id, record)| record.lock().ok().map(|m| (id.clone(), m.clone())))
            .collect()
    }

    /// Gold tier of the last completed request
    pub fn winners(&self) -> Vec<AgentId> {
        self.winners
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn begin_request(&self, request_id: &RequestId, agents: &[AgentId]) {
        if let Ok(mut id) = self.request_id.lock() {
            *id = Some(request_id.clone());
        }
        if let Ok(mut map) = self.agents.write() {
            *map = agents
                .iter()
                .map(|a| (a.clone(), Arc::new(Mutex::new(AgentMetrics::default()))))
                .collect();
        }
        if let Ok(mut winners) = self.winners.lock() {
            winners.clear();
        }
    }

    fn record_round(&self, record: &RoundRecord) {
        self.with_agent(&record.agent, |m| {
            if record.is_success() {
                m.rounds_succeeded += 1;
            } else {
                m.rounds_failed += 1;
                m.last_error = record.error.clone();
            }
            m.attempts += record.attempts;
            m.round_time_ms += record.duration_ms;
            m.round_tokens += record.tokens;
        });
    }

    fn record_ranking(&self, agent: &AgentId, duration: Duration, usage: TokenUsage) {
        self.with_agent(agent, |m| {
            m.ranking_time_ms += duration.as_millis() as u64;
            m.ranking_tokens += usage;
        });
    }

    fn record_completion(&self, podium: &Podium) {
        if let Ok(mut winners) = self.winners.lock() {
            *winners = podium.gold.clone();
        }
    }
}
