//! Anonymized peer ranking: labels, ballots, Borda aggregation and tiers.
//!
//! After the last refinement round every agent judges all final answers,
//! shown under single-letter labels. Decoded ballots are summed with a Borda
//! count and the distinct score levels become gold, silver and bronze tiers.

pub mod anonymize;
pub mod ballot;
pub mod borda;
pub mod outcome;

pub use anonymize::{AnonymizationMap, LabelAssignment, MAX_LABELS};
pub use ballot::{Ballot, RejectedBallot, decode_ballot, parse_ranking_letters};
pub use borda::{AgentScore, Podium, Tier, borda_scores};
pub use outcome::{Abstention, RankingOutcome};
