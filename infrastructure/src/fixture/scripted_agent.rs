//! Scripted agent capability backed by a TOML fixture.
//!
//! ```toml
//! [[agents]]
//! family = "openai"
//! variant = "gpt-5.2"
//! timeout_secs = 30
//! ranking = ["anthropic/claude-sonnet-4.5", "openai/gpt-5.2"]
//!
//! [[agents.rounds]]
//! answer = "42"
//! rationale = "Deep Thought said so"
//! discussion = { claude = "Why do you disagree?" }
//! tokens_in = 120
//! tokens_out = 40
//!
//! [[agents.rounds]]
//! answer = "Still 42"
//! fail_attempts = 1
//! ```
//!
//! Rounds past the end of `rounds` repeat the last entry.

use async_trait::async_trait;
use council_application::{
    AgentCapability, AgentError, AgentResponse, CallContext, Completion, CouncilAgent,
    PromptRequest, RankingRequest,
};
use council_domain::{AgentId, Reply, TokenUsage};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a fixture
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid fixture: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Fixture agent {0} has no rounds")]
    NoRounds(String),

    #[error("Fixture defines no agents")]
    NoAgents,
}

/// Fixture file root
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureFile {
    pub agents: Vec<FixtureAgent>,
}

/// One scripted council member
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureAgent {
    pub family: String,
    pub variant: String,
    /// Overrides the configured agent timeout
    pub timeout_secs: Option<u64>,
    /// Preferred agents best first (display name or variant)
    #[serde(default)]
    pub ranking: Vec<String>,
    /// Raw ranking response, used verbatim instead of `ranking`
    pub ranking_text: Option<String>,
    pub rounds: Vec<FixtureRound>,
}

impl FixtureAgent {
    pub fn id(&self) -> AgentId {
        AgentId::new(&self.family, &self.variant)
    }

    fn round(&self, round: u32) -> Option<&FixtureRound> {
        let index = (round.max(1) - 1) as usize;
        self.rounds.get(index).or_else(|| self.rounds.last())
    }
}

/// Scripted behavior for one round
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureRound {
    pub answer: String,
    pub rationale: Option<String>,
    /// Target name to message
    pub discussion: BTreeMap<String, String>,
    pub tokens_in: u64,
    pub tokens_out: u64,
    /// Simulated latency
    pub delay_ms: u64,
    /// Fail this many attempts of the round before answering
    pub fail_attempts: u32,
    /// Fail every attempt of the round with this message
    pub error: Option<String>,
}

impl FixtureRound {
    fn reply(&self) -> Reply {
        let mut reply = Reply::new(self.answer.clone());
        if let Some(rationale) = &self.rationale {
            reply = reply.with_rationale(rationale.clone());
        }
        for (target, message) in &self.discussion {
            reply = reply.with_message(target.clone(), message.clone());
        }
        reply
    }
}

/// Agent capability that plays back a [`FixtureAgent`]
pub struct ScriptedAgent {
    script: FixtureAgent,
    /// Every scripted answer per agent, to recognise anonymized answers
    answers: Arc<HashMap<AgentId, Vec<String>>>,
    attempts: Mutex<HashMap<u32, u32>>,
}

impl ScriptedAgent {
    pub fn new(script: FixtureAgent, answers: Arc<HashMap<AgentId, Vec<String>>>) -> Self {
        Self {
            script,
            answers,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn next_attempt(&self, round: u32) -> u32 {
        let mut attempts = self.attempts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = attempts.entry(round).or_insert(0);
        *count += 1;
        *count
    }

    fn resolve_preference(&self, name: &str) -> Option<&Vec<String>> {
        let name = name.trim().to_lowercase();
        self.answers
            .iter()
            .find(|(id, _)| {
                id.display_name().to_lowercase() == name || id.variant().to_lowercase() == name
            })
            .map(|(_, answers)| answers)
    }

    /// "Ranking:" section naming the labels of preferred agents
    fn ranking_response(&self, request: &RankingRequest) -> String {
        if let Some(text) = &self.script.ranking_text {
            return text.clone();
        }
        let mut lines = vec!["Ranking:".to_string()];
        let mut used = Vec::new();
        for name in &self.script.ranking {
            let Some(known) = self.resolve_preference(name) else {
                continue;
            };
            if let Some((label, _)) = request
                .answers
                .iter()
                .find(|(label, answer)| !used.contains(label) && known.contains(answer))
            {
                used.push(*label);
                lines.push(format!("{}. Response {}", used.len(), label));
            }
        }
        lines.join("\n")
    }
}

#[async_trait]
impl AgentCapability for ScriptedAgent {
    async fn prompt(
        &self,
        ctx: &CallContext,
        request: &PromptRequest,
    ) -> Result<AgentResponse, AgentError> {
        let round = request.meta.round;
        let Some(step) = self.script.round(round) else {
            return Err(AgentError::InvalidResponse(format!(
                "no scripted reply for round {}",
                round
            )));
        };
        let attempt = self.next_attempt(round);
        debug!(
            "{} round {} attempt {}",
            self.script.id(),
            round,
            attempt
        );

        if step.delay_ms > 0 {
            ctx.sleep(Duration::from_millis(step.delay_ms)).await?;
        }
        if let Some(error) = &step.error {
            return Err(AgentError::Request(error.clone()));
        }
        if attempt <= step.fail_attempts {
            return Err(AgentError::RateLimited(format!(
                "scripted failure {} of {}",
                attempt, step.fail_attempts
            )));
        }

        Ok(AgentResponse::new(
            step.reply(),
            TokenUsage::new(step.tokens_in, step.tokens_out),
        ))
    }

    async fn rank(
        &self,
        _ctx: &CallContext,
        request: &RankingRequest,
    ) -> Result<Completion, AgentError> {
        let text = self.ranking_response(request);
        let tokens_in = (request.prompt.len() / 4) as u64;
        let tokens_out = (text.len() / 4) as u64;
        Ok(Completion::new(text, TokenUsage::new(tokens_in, tokens_out)))
    }
}

/// Parse fixture text into council members in declaration order
pub fn parse_fixture(text: &str) -> Result<Vec<CouncilAgent>, FixtureError> {
    let fixture: FixtureFile = toml::from_str(text)?;
    if fixture.agents.is_empty() {
        return Err(FixtureError::NoAgents);
    }
    if let Some(empty) = fixture.agents.iter().find(|a| a.rounds.is_empty()) {
        return Err(FixtureError::NoRounds(empty.id().to_string()));
    }

    let answers: Arc<HashMap<AgentId, Vec<String>>> = Arc::new(
        fixture
            .agents
            .iter()
            .map(|a| (a.id(), a.rounds.iter().map(|r| r.answer.clone()).collect()))
            .collect(),
    );

    Ok(fixture
        .agents
        .into_iter()
        .map(|script| {
            let id = script.id();
            let timeout = script.timeout_secs.map(Duration::from_secs);
            let agent = CouncilAgent::new(id, Arc::new(ScriptedAgent::new(script, answers.clone())));
            match timeout {
                Some(timeout) => agent.with_timeout(timeout),
                None => agent,
            }
        })
        .collect())
}

/// Load council members from a fixture file
pub fn load_fixture(path: &Path) -> Result<Vec<CouncilAgent>, FixtureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_fixture(&text)
}
