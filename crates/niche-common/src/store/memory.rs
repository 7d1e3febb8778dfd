use parking_lot::RwLock;

use super::{CandidateStore, StoreError, upsert_into};
use crate::{CandidateRecord, UpsertAction};

/// プロセス内メモリの母集団（テスト・ストア未指定時）
#[derive(Debug, Default)]
pub struct InMemoryStore {
    candidates: RwLock<Vec<CandidateRecord>>,
}

impl InMemoryStore {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self {
            candidates: RwLock::new(candidates),
        }
    }
}

impl CandidateStore for InMemoryStore {
    fn load_candidates(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        Ok(self.candidates.read().clone())
    }

    fn upsert_candidate(&self, record: CandidateRecord) -> Result<UpsertAction, StoreError> {
        Ok(upsert_into(&mut self.candidates.write(), record))
    }

    fn has_profile(&self, candidate_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .candidates
            .read()
            .iter()
            .any(|candidate| candidate.candidate_id == candidate_id))
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.candidates.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkillVector;

    #[test]
    fn upsert_adds_then_updates() {
        let store = InMemoryStore::default();
        let record = CandidateRecord::new("A", SkillVector::academic(1.0, 2.0, 3.0));

        assert_eq!(store.upsert_candidate(record).unwrap(), UpsertAction::Added);
        assert_eq!(
            store
                .upsert_candidate(CandidateRecord::new("A", SkillVector::academic(4.0, 4.0, 4.0)))
                .unwrap(),
            UpsertAction::Updated
        );

        let loaded = store.load_candidates().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].skills, SkillVector::academic(4.0, 4.0, 4.0));
        assert!(store.has_profile("A").unwrap());
        assert!(!store.has_profile("B").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }
}
