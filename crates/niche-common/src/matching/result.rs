use serde::{Deserialize, Serialize};

use crate::SkillVector;

/// 類似候補者 1 件分の結果（クエリごとに再計算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    pub distance: f64,
    pub similarity: f64,
    /// `similarity × 100`
    pub similarity_percentage: f64,
    /// Raw, non-normalized skills of the candidate.
    pub skills: SkillVector,
    /// `query − candidate` on raw values.
    pub skill_differences: SkillVector,
}

impl MatchResult {
    pub fn new(
        candidate_id: impl Into<String>,
        query: &SkillVector,
        skills: SkillVector,
        distance: f64,
        similarity: f64,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            distance,
            similarity,
            similarity_percentage: similarity * 100.0,
            skill_differences: query.difference(&skills),
            skills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_percentage_and_differences() {
        let query = SkillVector::academic(5.0, 5.0, 5.0);
        let result = MatchResult::new("A", &query, SkillVector::academic(4.0, 6.0, 5.0), 0.3, 0.875);

        assert_eq!(result.similarity_percentage, 87.5);
        assert_eq!(result.skill_differences, SkillVector::academic(1.0, -1.0, 0.0));
        assert_eq!(result.skills.theory_statistics_ml, 6.0);
    }
}
