//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_capability;
pub mod broadcaster;
pub mod metrics;
pub mod persistence;
