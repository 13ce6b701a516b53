//! Discussion message value object

use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};

/// One message exchanged between two agents between rounds
///
/// Messages are append-only: once merged into the discussion state they are
/// never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionMessage {
    pub from: AgentId,
    pub message: String,
    /// Round in which the sender wrote the message
    pub round: u32,
}

impl DiscussionMessage {
    pub fn new(from: AgentId, message: impl Into<String>, round: u32) -> Self {
        Self {
            from,
            message: message.into(),
            round,
        }
    }
}
