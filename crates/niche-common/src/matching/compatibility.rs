//! 企業の「フィットする社員」クラスタに対する候補者の適合度
//!
//! Academic dimensions are scored against the cluster center with an
//! asymmetric curve (bonus above, decay below); GitHub embeddings are scored
//! directly as the mean cosine similarity to the reference employees.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{dimensions::SkillDimension, weights::SkillWeights};
use crate::{
    SkillVector, ValidationError,
    embedding::{self, EmbeddingValue},
};

/// センターとの差をスケールする最小許容幅
pub const MIN_TOLERANCE: f64 = 5.0;
/// 上振れボーナスの上限
pub const MAX_SKILL_SCORE: f64 = 120.0;
/// 下振れペナルティの下限
pub const MIN_SKILL_SCORE: f64 = 40.0;
const CURVE_STEEPNESS: f64 = 0.8;

/// Reference employee ("good fit") profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub skills: SkillVector,
    /// Native array or its JSON string encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_vector_embeddings: Option<EmbeddingValue>,
}

impl ReferenceProfile {
    /// `None` when absent or undecodable; such references drop out of the
    /// GitHub term instead of failing the request.
    pub fn embedding(&self) -> Option<Vec<f64>> {
        let value = self.github_vector_embeddings.as_ref()?;
        let decoded = value.decode();
        if decoded.is_none() {
            debug!(id = ?self.id, "skipping undecodable reference embedding");
        }
        decoded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub center: SkillVector,
    pub std_dev: SkillVector,
    pub cluster_weights: SkillVector,
    pub final_weights: SkillVector,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub distance: f64,
    pub similarity: f64,
    pub similarity_percentage: f64,
    pub skills: SkillVector,
    pub company_requirements: SkillVector,
    pub skill_differences: SkillVector,
    pub cluster_stats: ClusterStats,
    pub academic_scored: bool,
    pub github_scored: bool,
}

/// Asymmetric per-dimension score in `[40, 120]`; 100 at the center.
pub fn skill_score(candidate_value: f64, center: f64, std_dev: f64) -> f64 {
    let tolerance = MIN_TOLERANCE.max(std_dev);
    let difference = candidate_value - center;
    let normalized = difference / tolerance;

    if difference >= 0.0 {
        (100.0 + 20.0 * (1.0 - (-normalized * CURVE_STEEPNESS).exp())).min(MAX_SKILL_SCORE)
    } else {
        (100.0 * (normalized * CURVE_STEEPNESS).exp()).max(MIN_SKILL_SCORE)
    }
}

#[instrument(skip_all, fields(references = references.len()))]
pub fn score_compatibility(
    candidate: &SkillVector,
    references: &[ReferenceProfile],
    candidate_embedding: Option<&[f64]>,
    user_weights: Option<&SkillWeights>,
) -> Result<CompatibilityResult, ValidationError> {
    let references_have_academic = references.iter().any(|r| r.skills.has_academic_data());
    let candidate_embedding = candidate_embedding.filter(|vector| !vector.is_empty());
    let github_embeddings: Vec<Vec<f64>> = references.iter().filter_map(ReferenceProfile::embedding).collect();
    let has_github = !github_embeddings.is_empty() && candidate_embedding.is_some();

    if references.is_empty() {
        return Err(ValidationError::invalid(
            "no reference profiles provided for cluster analysis",
        ));
    }
    if !references_have_academic && !has_github {
        return Err(ValidationError::invalid(
            "reference profiles have no skill data available for similarity calculation",
        ));
    }
    if references.len() < 2 {
        return Err(ValidationError::invalid(
            "at least 2 reference profiles are required for company similarity",
        ));
    }

    let use_academic = references_have_academic && candidate.has_academic_data();
    let sample_size = references.len();

    let mut center = SkillVector::default();
    let mut std_dev = SkillVector::default();
    let mut cluster_weights = SkillVector::default();
    let mut final_weights = SkillVector::default();
    let mut scores = SkillVector::default();

    if use_academic {
        for dimension in SkillDimension::ACADEMIC {
            let mean = references
                .iter()
                .map(|r| r.skills.get(dimension))
                .sum::<f64>()
                / sample_size as f64;
            let variance = references
                .iter()
                .map(|r| (r.skills.get(dimension) - mean).powi(2))
                .sum::<f64>()
                / (sample_size - 1) as f64;
            let spread = variance.sqrt();

            center.set(dimension, mean);
            std_dev.set(dimension, spread);
            // A perfectly tight cluster counts as spread 1 here.
            let effective = if spread > 0.0 { spread } else { 1.0 };
            cluster_weights.set(dimension, 1.0 / (1.0 + effective));
        }

        let total: f64 = SkillDimension::ACADEMIC
            .iter()
            .map(|d| cluster_weights.get(*d))
            .sum();
        let factor = SkillDimension::ACADEMIC.len() as f64 / total;
        for dimension in SkillDimension::ACADEMIC {
            cluster_weights.set(dimension, cluster_weights.get(dimension) * factor);

            let weight = match user_weights {
                Some(weights) => weights.weight(dimension),
                None => cluster_weights.get(dimension),
            };
            final_weights.set(dimension, weight);
            scores.set(
                dimension,
                skill_score(
                    candidate.get(dimension),
                    center.get(dimension),
                    std_dev.get(dimension),
                ),
            );
        }
    }

    let mut github_score = None;
    if let Some(candidate_vector) = candidate_embedding.filter(|_| has_github) {
        let score = embedding::github_similarity_for(candidate_vector, &github_embeddings) * 100.0;

        center.github_similarity = score;
        scores.github_similarity = score;
        final_weights.github_similarity = user_weights
            .map(|weights| weights.weight(SkillDimension::GithubSimilarity))
            .unwrap_or(1.0);
        github_score = Some(score);
    }

    let total_weight: f64 = SkillDimension::ALL.iter().map(|d| final_weights.get(*d)).sum();
    if total_weight.is_nan() || total_weight <= 0.0 {
        return Err(ValidationError::configuration(
            "no weighted dimension left to score; candidate lacks the data the references carry",
        ));
    }

    let similarity_percentage: f64 = SkillDimension::ALL
        .iter()
        .map(|d| scores.get(*d) * final_weights.get(*d) / total_weight)
        .sum();

    let mut skill_differences = candidate.difference(&center);
    let mut skills = *candidate;
    if let Some(score) = github_score {
        skill_differences.github_similarity = score;
        skills.github_similarity = score;
    }

    debug!(
        similarity_percentage,
        academic = use_academic,
        github = github_score.is_some(),
        "scored company compatibility"
    );

    Ok(CompatibilityResult {
        distance: (100.0 - similarity_percentage) / 100.0,
        similarity: similarity_percentage / 100.0,
        similarity_percentage,
        skills,
        company_requirements: center,
        skill_differences,
        cluster_stats: ClusterStats {
            center,
            std_dev,
            cluster_weights,
            final_weights,
            sample_size,
        },
        academic_scored: use_academic,
        github_scored: github_score.is_some(),
    })
}
