//! Application-level configuration.
//!
//! - [`CouncilParams`]: round count, agent and ranking timeouts, label seed
//! - [`RetryConfig`]: backoff schedule for refinement calls

pub mod council_params;

pub use council_params::{CouncilParams, RetryConfig};
