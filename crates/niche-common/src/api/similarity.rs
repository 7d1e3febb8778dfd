use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{clamp_requested_top_k, skills::parse_skills};
use crate::{
    SkillVector, UpsertAction, ValidationError,
    matching::{GithubSimilarity, MatchConfig, MatchResult, MatchSummary, SkillWeights},
};

/// スキルベクトル類似検索リクエスト
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub skills: Value,
    #[serde(default)]
    pub top_k: Option<i64>,
    /// When set, the query candidate is written back to the store after
    /// ranking.
    #[serde(default)]
    pub candidate_id: Option<String>,
    #[serde(default)]
    pub weights: Option<SkillWeights>,
    #[serde(default)]
    pub github_similarities: Vec<GithubSimilarity>,
    #[serde(default)]
    pub exclude_ids: Vec<String>,
}

/// Engine arguments after boundary validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityQuery {
    pub skills: SkillVector,
    pub top_k: usize,
    pub weights: Option<SkillWeights>,
    pub candidate_id: Option<String>,
    pub github_similarities: Vec<GithubSimilarity>,
    pub exclude_ids: Vec<String>,
}

impl SimilarityRequest {
    pub fn validate(self, config: &MatchConfig) -> Result<SimilarityQuery, ValidationError> {
        let skills = parse_skills(&self.skills)?;
        if let Some(weights) = &self.weights {
            weights.validate()?;
        }
        let candidate_id = self
            .candidate_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        Ok(SimilarityQuery {
            skills,
            top_k: clamp_requested_top_k(config, self.top_k),
            weights: self.weights,
            candidate_id,
            github_similarities: self.github_similarities,
            exclude_ids: self.exclude_ids,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub success: bool,
    pub matches: Vec<MatchResult>,
    pub database_size: usize,
    pub query_skills: SkillVector,
    pub summary: MatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_added: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_action: Option<UpsertAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_candidate_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> SimilarityRequest {
        serde_json::from_value(body).expect("request deserializes")
    }

    #[test]
    fn applies_default_top_k_and_trims_candidate_id() {
        let query = request(json!({
            "skills": {"systems_infrastructure": 5},
            "candidate_id": "  cand-1 "
        }))
        .validate(&MatchConfig::default())
        .unwrap();

        assert_eq!(query.top_k, 5);
        assert_eq!(query.candidate_id.as_deref(), Some("cand-1"));
        assert!(query.weights.is_none());
    }

    #[test]
    fn clamps_top_k_into_range() {
        let config = MatchConfig::default();
        let negative = request(json!({"skills": {"product": 1}, "top_k": -3}))
            .validate(&config)
            .unwrap();
        let huge = request(json!({"skills": {"product": 1}, "top_k": 100000}))
            .validate(&config)
            .unwrap();

        assert_eq!(negative.top_k, 0);
        assert_eq!(huge.top_k, config.max_top_k);
    }

    #[test]
    fn all_zero_weights_are_configuration_error() {
        let err = request(json!({
            "skills": {"product": 1},
            "weights": {
                "systems_infrastructure": 0,
                "theory_statistics_ml": 0,
                "product": 0,
                "github_similarity": 0
            }
        }))
        .validate(&MatchConfig::default())
        .unwrap_err();

        assert!(matches!(err, ValidationError::Configuration(_)));
    }

    #[test]
    fn blank_candidate_id_is_ignored() {
        let query = request(json!({"skills": {"product": 1}, "candidate_id": "   "}))
            .validate(&MatchConfig::default())
            .unwrap();
        assert!(query.candidate_id.is_none());
    }
}
