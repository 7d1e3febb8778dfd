use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::skills::parse_skills;
use crate::{
    SkillVector, ValidationError,
    embedding::EmbeddingValue,
    matching::{CompatibilityResult, ReferenceProfile, SkillWeights},
};

/// 企業適合度リクエスト
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompatibilityRequest {
    #[serde(default)]
    pub candidate_skills: Value,
    #[serde(default)]
    pub reference_profiles: Vec<ReferenceProfile>,
    #[serde(default)]
    pub candidate_github_embedding: Option<EmbeddingValue>,
    #[serde(default)]
    pub weights: Option<SkillWeights>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityQuery {
    pub candidate: SkillVector,
    pub references: Vec<ReferenceProfile>,
    pub candidate_embedding: Option<Vec<f64>>,
    pub weights: Option<SkillWeights>,
}

impl CompatibilityRequest {
    /// A candidate may arrive with only a GitHub embedding, so an empty skills
    /// object is allowed when an embedding is present.
    pub fn validate(self) -> Result<CompatibilityQuery, ValidationError> {
        let candidate_embedding = match self.candidate_github_embedding {
            None => None,
            Some(value) => Some(value.decode().ok_or_else(|| {
                ValidationError::invalid("candidate_github_embedding is not a valid vector")
            })?),
        };

        let candidate = match (&self.candidate_skills, &candidate_embedding) {
            (Value::Null, Some(_)) => SkillVector::default(),
            (Value::Object(map), Some(_)) if map.is_empty() => SkillVector::default(),
            (value, _) => parse_skills(value)?,
        };

        if let Some(weights) = &self.weights {
            weights.validate()?;
        }

        Ok(CompatibilityQuery {
            candidate,
            references: self.reference_profiles,
            candidate_embedding,
            weights: self.weights,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResponse {
    pub success: bool,
    pub compatibility: CompatibilityResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedding_only_candidate_is_accepted() {
        let request: CompatibilityRequest = serde_json::from_value(json!({
            "candidate_github_embedding": "[0.5, 0.5]",
            "reference_profiles": [
                {"github_vector_embeddings": [1.0, 0.0]},
                {"github_vector_embeddings": [0.0, 1.0]}
            ]
        }))
        .unwrap();

        let query = request.validate().unwrap();
        assert_eq!(query.candidate, SkillVector::default());
        assert_eq!(query.candidate_embedding, Some(vec![0.5, 0.5]));
        assert_eq!(query.references.len(), 2);
    }

    #[test]
    fn reference_profiles_read_flat_skill_fields() {
        let request: CompatibilityRequest = serde_json::from_value(json!({
            "candidate_skills": {"product": 3},
            "reference_profiles": [
                {"id": "e1", "systems_infrastructure": 4, "product": 2},
                {"id": "e2", "theory_statistics_ml": 1}
            ]
        }))
        .unwrap();

        let query = request.validate().unwrap();
        assert_eq!(query.references[0].skills, SkillVector::academic(4.0, 0.0, 2.0));
        assert_eq!(query.references[1].id.as_deref(), Some("e2"));
    }

    #[test]
    fn rejects_missing_candidate_data() {
        let request: CompatibilityRequest =
            serde_json::from_value(json!({"reference_profiles": []})).unwrap();
        assert!(request.validate().is_err());
    }
}
