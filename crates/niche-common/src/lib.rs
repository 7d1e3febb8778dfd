pub mod api;
pub mod embedding;
pub mod error;
pub mod logging;
pub mod matching;
pub mod store;

use serde::{Deserialize, Serialize};

pub use error::ValidationError;

// Commonly used data models for matching functions.

/// 候補者のスキルベクトル（4次元固定）
///
/// Academic dimensions are unbounded scored strengths; `github_similarity`
/// is a precomputed technical-similarity score, normally within `[0, 1]`.
/// Missing dimensions deserialize to `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillVector {
    pub systems_infrastructure: f64,
    pub theory_statistics_ml: f64,
    pub product: f64,
    pub github_similarity: f64,
}

impl SkillVector {
    pub const fn new(
        systems_infrastructure: f64,
        theory_statistics_ml: f64,
        product: f64,
        github_similarity: f64,
    ) -> Self {
        Self {
            systems_infrastructure,
            theory_statistics_ml,
            product,
            github_similarity,
        }
    }

    /// Academic scores only; `github_similarity` stays at zero.
    pub const fn academic(systems_infrastructure: f64, theory_statistics_ml: f64, product: f64) -> Self {
        Self::new(systems_infrastructure, theory_statistics_ml, product, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub candidate_id: String,
    #[serde(default)]
    pub skills: SkillVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f64>>,
}

impl CandidateRecord {
    pub fn new(candidate_id: impl Into<String>, skills: SkillVector) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            skills,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Outcome of writing a candidate into a population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UpsertAction {
    Added,
    Updated,
}
