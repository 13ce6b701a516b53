//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod export;
pub mod fixture;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileConfig, FileCouncilConfig, FileOutputConfig, FileRetryConfig,
};
pub use export::JsonSnapshotExporter;
pub use fixture::{FixtureError, ScriptedAgent, load_fixture, parse_fixture};
pub use logging::JsonlPersistenceSink;
