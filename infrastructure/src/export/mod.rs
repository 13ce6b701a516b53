//! Static export of finished requests.

mod json_snapshot;

pub use json_snapshot::JsonSnapshotExporter;
