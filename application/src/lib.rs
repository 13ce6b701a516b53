//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod context;
pub mod metrics;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilParams, RetryConfig};
pub use context::{CallContext, ContextError};
pub use metrics::{AgentMetrics, InMemoryMetrics};
pub use ports::{
    agent_capability::{
        AgentCapability, AgentError, AgentResponse, Completion, CouncilAgent, PromptRequest,
        RankingRequest,
    },
    broadcaster::{Broadcaster, ChannelBroadcaster, CompositeBroadcaster, NoBroadcast},
    metrics::{MetricsSink, NoMetrics},
    persistence::{ExportSink, PersistenceSink, SinkError},
};
pub use use_cases::ranking::{RankingEngine, RankingReport};
pub use use_cases::retry::RetryPolicy;
pub use use_cases::round_executor::{CouncilState, RoundEnv, RoundExecutor};
pub use use_cases::run_council::{RunCouncilError, RunCouncilInput, RunCouncilUseCase};
