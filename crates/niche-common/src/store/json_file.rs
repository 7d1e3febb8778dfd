use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CandidateStore, StoreError, upsert_into};
use crate::{CandidateRecord, UpsertAction};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    candidates: Vec<CandidateRecord>,
}

/// JSON スナップショットファイルに母集団を保存するストア
///
/// Writes go to a sibling temp file that is renamed over the snapshot, so a
/// reader never sees a half-written file. A missing file is an empty
/// population.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_snapshot(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store snapshot missing; starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot.candidates)
    }

    fn write_snapshot(&self, candidates: Vec<CandidateRecord>) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            candidates,
        };
        let encoded = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, encoded).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}

impl CandidateStore for JsonFileStore {
    fn load_candidates(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        self.read_snapshot()
    }

    fn upsert_candidate(&self, record: CandidateRecord) -> Result<UpsertAction, StoreError> {
        let _guard = self.write_lock.lock();

        let mut candidates = self.read_snapshot()?;
        let candidate_id = record.candidate_id.clone();
        let action = upsert_into(&mut candidates, record);
        let size = candidates.len();
        self.write_snapshot(candidates)?;

        info!(%candidate_id, %action, size, "persisted candidate");
        Ok(action)
    }
}
