//! Persistence and static export ports.
//!
//! Both are best-effort: the council logs their failures and carries on.

use council_domain::{CompletionStatus, CouncilOutcome, CouncilSummary, RequestId, RoundRecord};
use thiserror::Error;

/// Errors raised by persistence and export adapters
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for finished requests
pub trait PersistenceSink: Send + Sync {
    /// Store the summary and every per-round, per-agent record
    fn save_request(
        &self,
        summary: &CouncilSummary,
        records: &[RoundRecord],
    ) -> Result<(), SinkError>;

    /// Write the completion marker; also called when a request is cancelled
    fn mark_finished(
        &self,
        request_id: &RequestId,
        status: CompletionStatus,
    ) -> Result<(), SinkError>;
}

/// Offline rendering of a complete request
pub trait ExportSink: Send + Sync {
    fn export(&self, outcome: &CouncilOutcome) -> Result<(), SinkError>;
}
