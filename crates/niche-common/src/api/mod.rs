//! HTTP リクエスト / レスポンス DTO と境界バリデーション

pub mod candidate;
pub mod compatibility;
pub mod embedding;
pub mod similarity;
pub mod skills;

pub use candidate::{CandidateCountResponse, CandidateRequest, CandidateResponse};
pub use compatibility::{CompatibilityQuery, CompatibilityRequest, CompatibilityResponse};
pub use embedding::{EmbeddingSimilarityRequest, EmbeddingSimilarityResponse};
pub use similarity::{SimilarityQuery, SimilarityRequest, SimilarityResponse};
pub use skills::parse_skills;

use crate::matching::MatchConfig;

/// Negative values clamp to 0; missing values take the configured default.
pub(crate) fn clamp_requested_top_k(config: &MatchConfig, requested: Option<i64>) -> usize {
    config.clamp_top_k(requested.map(|k| usize::try_from(k.max(0)).unwrap_or(usize::MAX)))
}
