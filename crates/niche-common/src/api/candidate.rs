use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::skills::parse_skills;
use crate::{CandidateRecord, UpsertAction, ValidationError, embedding::EmbeddingValue};

/// 候補者の登録・更新リクエスト
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateRequest {
    #[serde(default)]
    pub candidate_id: String,
    #[serde(default)]
    pub skills: Value,
    #[serde(default)]
    pub embedding: Option<EmbeddingValue>,
}

impl CandidateRequest {
    pub fn validate(self) -> Result<CandidateRecord, ValidationError> {
        let candidate_id = self.candidate_id.trim();
        if candidate_id.is_empty() {
            return Err(ValidationError::invalid("candidate_id is required"));
        }

        let skills = parse_skills(&self.skills)?;
        let record = CandidateRecord::new(candidate_id, skills);

        match self.embedding {
            None => Ok(record),
            Some(value) => value
                .decode()
                .map(|vector| record.with_embedding(vector))
                .ok_or_else(|| {
                    ValidationError::invalid(
                        "embedding must be a non-empty array of numbers or its JSON encoding",
                    )
                }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub success: bool,
    pub candidate_id: String,
    pub action: UpsertAction,
    pub database_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateCountResponse {
    pub database_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> CandidateRequest {
        serde_json::from_value(body).expect("request deserializes")
    }

    #[test]
    fn builds_record_with_decoded_embedding() {
        let record = request(json!({
            "candidate_id": "c-9",
            "skills": {"theory_statistics_ml": 2.5},
            "embedding": "[0.25, 0.75]"
        }))
        .validate()
        .unwrap();

        assert_eq!(record.candidate_id, "c-9");
        assert_eq!(record.skills.theory_statistics_ml, 2.5);
        assert_eq!(record.embedding, Some(vec![0.25, 0.75]));
    }

    #[test]
    fn rejects_missing_id_and_bad_embedding() {
        assert!(request(json!({"skills": {"product": 1}})).validate().is_err());
        assert!(
            request(json!({"candidate_id": "x", "skills": {"product": 1}, "embedding": "oops"}))
                .validate()
                .is_err()
        );
    }
}
