use serde::{Deserialize, Serialize};

use super::result::MatchResult;

/// レスポンス用のサマリー統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total_matches: usize,
    pub profiles_found: usize,
    pub average_similarity: f64,
    pub best_match_similarity: f64,
}

impl MatchSummary {
    /// Matches are drawn from the loaded population, so every one of them
    /// resolves to a stored profile and `profiles_found == total_matches`.
    pub fn from_matches(matches: &[MatchResult]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let total = matches.len();
        let sum: f64 = matches.iter().map(|m| m.similarity).sum();
        let best = matches
            .iter()
            .map(|m| m.similarity)
            .fold(f64::NEG_INFINITY, f64::max);

        Self {
            total_matches: total,
            profiles_found: total,
            average_similarity: sum / total as f64,
            best_match_similarity: best,
        }
    }
}
