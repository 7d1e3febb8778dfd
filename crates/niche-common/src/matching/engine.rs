use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use tracing::{debug, instrument};

use super::{
    distance::{cosine_similarity, weighted_distance},
    normalize::PopulationStats,
    ranking::rank_top_k,
    result::MatchResult,
    weights::SkillWeights,
};
use crate::{CandidateRecord, SkillVector, UpsertAction, store::upsert_into};

/// 外部で計算済みの GitHub 類似度（候補者 ID ごと）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubSimilarity {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub similarity: f64,
}

/// Upstream lookups key candidates by numeric or string ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// スキルベクトル類似検索エンジン
///
/// Holds its population explicitly; there is no process-wide instance. The
/// engine has no internal locking, so a host sharing one across threads must
/// serialize mutation against queries itself.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    candidates: Vec<CandidateRecord>,
}

impl SimilarityEngine {
    pub fn new(candidates: Vec<CandidateRecord>) -> Self {
        Self { candidates }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[CandidateRecord] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<CandidateRecord> {
        self.candidates
    }

    pub fn dataset_size(&self) -> usize {
        self.candidates.len()
    }

    /// First record with the id; duplicates after it are shadowed.
    pub fn candidate(&self, candidate_id: &str) -> Option<&CandidateRecord> {
        self.candidates
            .iter()
            .find(|candidate| candidate.candidate_id == candidate_id)
    }

    /// Appends without a uniqueness check.
    pub fn add_candidate(
        &mut self,
        candidate_id: impl Into<String>,
        skills: SkillVector,
        embedding: Option<Vec<f64>>,
    ) {
        self.candidates.push(CandidateRecord {
            candidate_id: candidate_id.into(),
            skills,
            embedding,
        });
    }

    /// 既存 ID なら最初のレコードを更新、なければ追加
    pub fn upsert_candidate(
        &mut self,
        candidate_id: &str,
        skills: SkillVector,
        embedding: Option<Vec<f64>>,
    ) -> UpsertAction {
        upsert_into(
            &mut self.candidates,
            CandidateRecord {
                candidate_id: candidate_id.to_string(),
                skills,
                embedding,
            },
        )
    }

    /// Overwrites every candidate's `github_similarity`; ids missing from
    /// `similarities` get 0.0. The last entry wins for duplicated ids.
    pub fn apply_github_similarities(&mut self, similarities: &[GithubSimilarity]) {
        let mut lookup: HashMap<&str, f64> = HashMap::with_capacity(similarities.len());
        for entry in similarities {
            lookup.insert(entry.id.as_str(), entry.similarity);
        }

        for candidate in &mut self.candidates {
            candidate.skills.github_similarity = lookup
                .get(candidate.candidate_id.as_str())
                .copied()
                .unwrap_or(0.0);
        }
    }

    pub fn population_stats(&self) -> PopulationStats {
        PopulationStats::from_population(&self.candidates)
    }

    /// Z-score against the current population; recomputed on every call.
    pub fn normalize(&self, skills: &SkillVector) -> SkillVector {
        self.population_stats().normalize(skills)
    }

    pub fn distance(&self, a: &SkillVector, b: &SkillVector, weights: Option<&SkillWeights>) -> f64 {
        weighted_distance(a, b, weights)
    }

    pub fn cosine_similarity(&self, a: &SkillVector, b: &SkillVector) -> f64 {
        cosine_similarity(a, b)
    }

    /// クエリに近い候補者を上位 `top_k` 件返す
    ///
    /// The query and every candidate are normalized against one statistics
    /// snapshot. Results carry the candidates' raw skills.
    #[instrument(skip(self, query, weights, exclude_ids), fields(population = self.candidates.len()))]
    pub fn find_similar(
        &self,
        query: &SkillVector,
        top_k: usize,
        weights: Option<&SkillWeights>,
        exclude_ids: &[String],
    ) -> Vec<MatchResult> {
        if self.candidates.is_empty() {
            debug!("empty population, nothing to rank");
            return Vec::new();
        }

        let stats = self.population_stats();
        let normalized_query = stats.normalize(query);
        let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();

        let matches: Vec<MatchResult> = self
            .candidates
            .iter()
            .filter(|candidate| !excluded.contains(candidate.candidate_id.as_str()))
            .map(|candidate| {
                let normalized = stats.normalize(&candidate.skills);
                MatchResult::new(
                    candidate.candidate_id.clone(),
                    query,
                    candidate.skills,
                    weighted_distance(&normalized_query, &normalized, weights),
                    cosine_similarity(&normalized_query, &normalized),
                )
            })
            .collect();

        let scored = matches.len();
        let ranked = rank_top_k(matches, top_k);
        debug!(scored, returned = ranked.len(), "ranked candidates");
        ranked
    }
}
