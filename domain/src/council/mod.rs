//! Council request lifecycle: phases, events and results.

pub mod event;
pub mod run;
pub mod summary;

pub use event::{CouncilEvent, EventEnvelope};
pub use run::{CouncilPhase, CouncilRun};
pub use summary::{CompletionStatus, CouncilOutcome, CouncilSummary, winning_answer};
