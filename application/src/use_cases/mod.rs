//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod ranking;
pub mod retry;
pub mod round_executor;
pub mod run_council;
pub mod shared;
