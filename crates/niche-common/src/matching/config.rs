use crate::embedding::EmbeddingAggregation;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MAX_TOP_K: usize = 200;

/// 検索パラメータの既定値（環境変数から上書き可能）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub embedding_aggregation: EmbeddingAggregation,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
            embedding_aggregation: EmbeddingAggregation::Sum,
        }
    }
}

impl MatchConfig {
    /// 環境変数から読み込み。未設定・不正値は既定値にフォールバック
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_top_k = std::env::var("NICHE_MAX_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_top_k);
        let default_top_k = std::env::var("NICHE_DEFAULT_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_top_k);
        let embedding_aggregation = std::env::var("NICHE_EMBEDDING_AGGREGATION")
            .ok()
            .and_then(|s| s.trim().to_ascii_lowercase().parse().ok())
            .unwrap_or(defaults.embedding_aggregation);

        Self {
            default_top_k: default_top_k.min(max_top_k),
            max_top_k,
            embedding_aggregation,
        }
    }

    /// Missing → `default_top_k`; anything above `max_top_k` is clamped.
    pub fn clamp_top_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_top_k).min(self.max_top_k)
    }
}
