//! Refinement round data: replies, token usage, and per-round records.

pub mod ledger;
pub mod record;
pub mod reply;

pub use ledger::{LatestReplies, RoundReply};
pub use record::RoundRecord;
pub use reply::{Reply, RoundMeta, TokenUsage};
