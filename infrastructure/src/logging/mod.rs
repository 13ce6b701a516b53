//! Request persistence as JSON lines.
//!
//! Provides [`JsonlPersistenceSink`], which implements the
//! [`PersistenceSink`](council_application::PersistenceSink) port.

mod jsonl_persistence;

pub use jsonl_persistence::JsonlPersistenceSink;
