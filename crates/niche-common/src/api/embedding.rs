use serde::{Deserialize, Serialize};

use super::clamp_requested_top_k;
use crate::{
    ValidationError,
    embedding::{EmbeddingAggregation, EmbeddingMatch, EmbeddingRankOptions, EmbeddingRanking, EmbeddingRow, EmbeddingValue},
    matching::MatchConfig,
};

/// 埋め込みベクトル類似検索リクエスト
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddingSimilarityRequest {
    #[serde(default)]
    pub reference_embeddings: Vec<EmbeddingValue>,
    #[serde(default)]
    pub candidates: Vec<EmbeddingRow>,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub aggregation: Option<EmbeddingAggregation>,
    #[serde(default)]
    pub exclude_subscriber_id: Option<i64>,
    /// Best rows each reference contributes before aggregation.
    #[serde(default)]
    pub per_reference_limit: Option<usize>,
}

impl EmbeddingSimilarityRequest {
    /// Splits the request into ranking inputs. Individual bad vectors are left
    /// in place for the ranker to skip, but at least one reference must decode.
    pub fn validate(
        self,
        config: &MatchConfig,
    ) -> Result<(Vec<EmbeddingValue>, Vec<EmbeddingRow>, EmbeddingRankOptions), ValidationError> {
        if self.reference_embeddings.is_empty() {
            return Err(ValidationError::invalid(
                "reference_embeddings must contain at least one vector",
            ));
        }
        if self.candidates.is_empty() {
            return Err(ValidationError::invalid(
                "candidates must contain at least one embedding row",
            ));
        }
        if self.reference_embeddings.iter().all(|value| value.decode().is_none()) {
            return Err(ValidationError::invalid(
                "no reference embedding could be decoded",
            ));
        }
        if self.per_reference_limit == Some(0) {
            return Err(ValidationError::invalid(
                "per_reference_limit must be at least 1",
            ));
        }

        let options = EmbeddingRankOptions {
            top_k: clamp_requested_top_k(config, self.top_k),
            aggregation: self.aggregation.unwrap_or(config.embedding_aggregation),
            exclude_subscriber_id: self.exclude_subscriber_id,
            per_reference_limit: self.per_reference_limit,
        };
        Ok((self.reference_embeddings, self.candidates, options))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSimilarityResponse {
    pub success: bool,
    pub aggregation: EmbeddingAggregation,
    pub top_k: usize,
    pub matches: Vec<EmbeddingMatch>,
    pub reference_count: usize,
    pub skipped_references: usize,
    pub candidate_rows: usize,
    pub skipped_rows: usize,
}

impl EmbeddingSimilarityResponse {
    pub fn new(options: &EmbeddingRankOptions, ranking: EmbeddingRanking) -> Self {
        Self {
            success: true,
            aggregation: options.aggregation,
            top_k: options.top_k,
            matches: ranking.matches,
            reference_count: ranking.reference_count,
            skipped_references: ranking.skipped_references,
            candidate_rows: ranking.candidate_rows,
            skipped_rows: ranking.skipped_rows,
        }
    }
}
