//! Core domain concepts shared across all subdomains.
//!
//! - [`agent::AgentId`]: identity of a participating agent (family + variant)
//! - [`question::Question`]: a validated question to pose to the council
//! - [`request::RequestId`]: identity of one council request
//! - [`error::DomainError`]: domain-level errors

pub mod agent;
pub mod error;
pub mod question;
pub mod request;
pub mod string;
