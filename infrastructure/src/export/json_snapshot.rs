//! Pretty JSON snapshot of a whole council outcome.
//!
//! The snapshot holds everything an offline renderer needs: summary, every
//! round record, the anonymization map, ballots, scores, podium and the
//! discussion threads.

use council_application::ports::persistence::{ExportSink, SinkError};
use council_domain::{CouncilOutcome, RequestId};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes `<dir>/<request_id>.json`
pub struct JsonSnapshotExporter {
    dir: PathBuf,
}

impl JsonSnapshotExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, request_id: &RequestId) -> PathBuf {
        self.dir.join(format!("{}.json", request_id))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for JsonSnapshotExporter {
    fn export(&self, outcome: &CouncilOutcome) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&outcome.summary.request_id);

        // Sibling temp file, renamed into place once complete
        let tmp = path.with_extension("json.tmp");
        let written = write_pretty(&tmp, outcome)
            .and_then(|()| std::fs::rename(&tmp, &path).map_err(SinkError::from));
        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp) {
                warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
            return Err(e);
        }

        info!("Exported snapshot to {}", path.display());
        Ok(())
    }
}

fn write_pretty(path: &Path, outcome: &CouncilOutcome) -> Result<(), SinkError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, outcome)?;
    writer.flush()?;
    Ok(())
}
