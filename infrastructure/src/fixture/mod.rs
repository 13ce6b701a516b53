//! Fixture-driven agents for dry runs.
//!
//! A fixture is a TOML file describing every council member and what it
//! answers in each round, so the whole engine can run without a vendor
//! adapter.

mod scripted_agent;

pub use scripted_agent::{
    FixtureAgent, FixtureError, FixtureFile, FixtureRound, ScriptedAgent, load_fixture,
    parse_fixture,
};
