//! JSONL persistence for council requests.
//!
//! Every request gets its own `<request_id>.jsonl` file under the results
//! directory. Each line is one JSON object with a `type` field
//! (`round`, `summary` or `finished`) and a `timestamp`.

use council_application::ports::persistence::{PersistenceSink, SinkError};
use council_domain::{CompletionStatus, CouncilSummary, RequestId, RoundRecord};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Persistence sink writing one JSON object per line
///
/// Appends are serialized through a `Mutex` so concurrent requests never
/// interleave partial lines.
pub struct JsonlPersistenceSink {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonlPersistenceSink {
    /// Create a sink writing under `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    /// Path of the file holding `request_id`
    pub fn path_for(&self, request_id: &RequestId) -> PathBuf {
        self.dir.join(format!("{}.jsonl", request_id))
    }

    fn open(&self, request_id: &RequestId) -> Result<BufWriter<File>, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(request_id))?;
        Ok(BufWriter::new(file))
    }

    fn append<T: Serialize>(
        &self,
        request_id: &RequestId,
        records: impl IntoIterator<Item = (&'static str, T)>,
    ) -> Result<(), SinkError> {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut lines = Vec::new();
        for (kind, payload) in records {
            lines.push(serde_json::to_string(&tag(kind, &timestamp, payload)?)?);
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut writer = self.open(request_id)?;
        for line in &lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        debug!("Appended {} line(s) for request {}", lines.len(), request_id);
        Ok(())
    }
}

/// Merge the payload with `type` and `timestamp`
fn tag<T: Serialize>(
    kind: &str,
    timestamp: &str,
    payload: T,
) -> Result<serde_json::Value, SinkError> {
    let value = serde_json::to_value(payload)?;
    Ok(match value {
        serde_json::Value::Object(mut map) => {
            map.insert("type".to_string(), kind.into());
            map.insert("timestamp".to_string(), timestamp.into());
            serde_json::Value::Object(map)
        }
        other => serde_json::json!({
            "type": kind,
            "timestamp": timestamp,
            "data": other,
        }),
    })
}

#[derive(Serialize)]
struct FinishedMarker<'a> {
    request_id: &'a RequestId,
    #[serde(flatten)]
    status: CompletionStatus,
}

impl PersistenceSink for JsonlPersistenceSink {
    fn save_request(
        &self,
        summary: &CouncilSummary,
        records: &[RoundRecord],
    ) -> Result<(), SinkError> {
        let mut lines = records
            .iter()
            .map(|r| Ok(("round", serde_json::to_value(r)?)))
            .collect::<Result<Vec<_>, SinkError>>()?;
        lines.push(("summary", serde_json::to_value(summary)?));
        self.append(&summary.request_id, lines)
    }

    fn mark_finished(
        &self,
        request_id: &RequestId,
        status: CompletionStatus,
    ) -> Result<(), SinkError> {
        self.append(
            request_id,
            [("finished", FinishedMarker { request_id, status })],
        )
    }
}
