//! Progress reporting driven by lifecycle events

pub mod reporter;
