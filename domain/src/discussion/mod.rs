//! Agent-to-agent discussion between refinement rounds.

pub mod message;
pub mod state;
pub mod target;

pub use message::DiscussionMessage;
pub use state::{DiscussionState, MergeReport};
pub use target::{UnresolvedTarget, resolve_target};
