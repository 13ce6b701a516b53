//! Domain layer for llm-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a fixed set of agents answering one question:
//!
//! - **Refinement rounds**: every agent answers, sees the others' latest
//!   answers, and may address messages to specific peers for the next round
//! - **Anonymized ranking**: every agent orders all final answers shown under
//!   single-letter labels; a Borda count turns the ballots into gold, silver
//!   and bronze tiers, each of which may hold several agents
//!
//! Everything here is synchronous and deterministic given its inputs
//! (including the RNG used for labels).

pub mod config;
pub mod core;
pub mod council;
pub mod discussion;
pub mod prompt;
pub mod ranking;
pub mod round;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use crate::core::{
    agent::AgentId, error::DomainError, question::Question, request::RequestId, string::preview,
};
pub use council::{
    CompletionStatus, CouncilEvent, CouncilOutcome, CouncilPhase, CouncilRun, CouncilSummary,
    EventEnvelope, winning_answer,
};
pub use discussion::{DiscussionMessage, DiscussionState, MergeReport, UnresolvedTarget};
pub use prompt::PromptTemplate;
pub use ranking::{
    Abstention, AgentScore, AnonymizationMap, Ballot, Podium, RankingOutcome, RejectedBallot, Tier,
};
pub use round::{LatestReplies, Reply, RoundMeta, RoundRecord, RoundReply, TokenUsage};
