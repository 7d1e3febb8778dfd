//! 候補者母集団の永続化
//!
//! Handlers load a snapshot from a [`CandidateStore`], build a fresh
//! `SimilarityEngine` over it, and write new candidates back through the same
//! store. Implementations serialize their own writers.

pub mod json_file;
pub mod memory;

use std::path::PathBuf;

use thiserror::Error;

use crate::{CandidateRecord, UpsertAction};

pub use json_file::{JsonFileStore, SNAPSHOT_VERSION};
pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store snapshot is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("unsupported store snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

pub trait CandidateStore: Send + Sync {
    /// Full population in store order.
    fn load_candidates(&self) -> Result<Vec<CandidateRecord>, StoreError>;

    /// Replaces the first record with the same id or appends a new one.
    fn upsert_candidate(&self, record: CandidateRecord) -> Result<UpsertAction, StoreError>;

    fn has_profile(&self, candidate_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .load_candidates()?
            .iter()
            .any(|candidate| candidate.candidate_id == candidate_id))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.load_candidates()?.len())
    }
}

/// Shared upsert rule for stores that hold a plain `Vec`.
pub(crate) fn upsert_into(candidates: &mut Vec<CandidateRecord>, record: CandidateRecord) -> UpsertAction {
    match candidates
        .iter_mut()
        .find(|existing| existing.candidate_id == record.candidate_id)
    {
        Some(existing) => {
            existing.skills = record.skills;
            if record.embedding.is_some() {
                existing.embedding = record.embedding;
            }
            UpsertAction::Updated
        }
        None => {
            candidates.push(record);
            UpsertAction::Added
        }
    }
}
