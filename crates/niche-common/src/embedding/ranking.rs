use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{
    similarity::cosine_similarity,
    value::{EmbeddingRow, EmbeddingValue},
};

/// 候補者ごとのスコア集約方法
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmbeddingAggregation {
    /// Total over every scored (reference, row) pair.
    #[default]
    Sum,
    Max,
    Mean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRankOptions {
    pub top_k: usize,
    pub aggregation: EmbeddingAggregation,
    pub exclude_subscriber_id: Option<i64>,
    /// Best rows kept per reference before aggregation; `None` keeps all.
    pub per_reference_limit: Option<usize>,
}

impl Default for EmbeddingRankOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            aggregation: EmbeddingAggregation::default(),
            exclude_subscriber_id: None,
            per_reference_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatch {
    pub subscriber_id: i64,
    pub score: f64,
    /// (reference, row) pairs scored for this subscriber.
    pub comparisons: usize,
    pub best_similarity: f64,
    pub matched_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRanking {
    pub matches: Vec<EmbeddingMatch>,
    pub reference_count: usize,
    pub skipped_references: usize,
    pub candidate_rows: usize,
    pub skipped_rows: usize,
}

#[derive(Default)]
struct Accumulator {
    total: f64,
    best: f64,
    comparisons: usize,
    rows: usize,
}

impl Accumulator {
    fn score(&self, aggregation: EmbeddingAggregation) -> f64 {
        match aggregation {
            EmbeddingAggregation::Sum => self.total,
            EmbeddingAggregation::Max => self.best,
            EmbeddingAggregation::Mean if self.comparisons > 0 => {
                self.total / self.comparisons as f64
            }
            EmbeddingAggregation::Mean => 0.0,
        }
    }
}

/// 参照ベクトル群と候補行を比較し、候補者単位でランキング
///
/// Rows or references that do not decode are skipped and counted, never
/// raised. With `per_reference_limit`, each reference only contributes its
/// best N rows, so many weak rows cannot outweigh a few strong ones. Scores
/// sort descending with ties broken by subscriber id.
#[instrument(skip_all, fields(references = references.len(), rows = rows.len(), aggregation = %options.aggregation))]
pub fn rank_candidates(
    references: &[EmbeddingValue],
    rows: &[EmbeddingRow],
    options: &EmbeddingRankOptions,
) -> EmbeddingRanking {
    let reference_vectors: Vec<Vec<f64>> = references.iter().filter_map(EmbeddingValue::decode).collect();
    let skipped_references = references.len() - reference_vectors.len();

    let mut per_subscriber: BTreeMap<i64, Accumulator> = BTreeMap::new();
    let mut decoded_rows: Vec<(i64, Vec<f64>)> = Vec::with_capacity(rows.len());
    let mut skipped_rows = 0;
    let mut candidate_rows = 0;

    for row in rows {
        if options.exclude_subscriber_id == Some(row.subscriber_id) {
            continue;
        }
        candidate_rows += 1;

        let Some(vector) = row.decode() else {
            debug!(subscriber_id = row.subscriber_id, "skipping undecodable embedding row");
            skipped_rows += 1;
            continue;
        };

        per_subscriber
            .entry(row.subscriber_id)
            .or_insert_with(|| Accumulator {
                best: f64::NEG_INFINITY,
                ..Accumulator::default()
            })
            .rows += 1;
        decoded_rows.push((row.subscriber_id, vector));
    }

    for reference in &reference_vectors {
        let mut scored: Vec<(i64, f64)> = decoded_rows
            .iter()
            .map(|(subscriber_id, vector)| (*subscriber_id, cosine_similarity(reference, vector)))
            .collect();

        if let Some(limit) = options.per_reference_limit {
            // stable sort keeps row order among equal similarities
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
            scored.truncate(limit);
        }

        for (subscriber_id, similarity) in scored {
            if let Some(entry) = per_subscriber.get_mut(&subscriber_id) {
                entry.total += similarity;
                entry.best = entry.best.max(similarity);
                entry.comparisons += 1;
            }
        }
    }

    let mut matches: Vec<EmbeddingMatch> = per_subscriber
        .into_iter()
        .filter(|(_, acc)| acc.comparisons > 0)
        .map(|(subscriber_id, acc)| EmbeddingMatch {
            subscriber_id,
            score: acc.score(options.aggregation),
            comparisons: acc.comparisons,
            best_similarity: acc.best,
            matched_rows: acc.rows,
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.subscriber_id.cmp(&b.subscriber_id))
    });
    matches.truncate(options.top_k);

    debug!(
        returned = matches.len(),
        skipped_rows,
        skipped_references,
        "ranked embedding candidates"
    );

    EmbeddingRanking {
        matches,
        reference_count: reference_vectors.len(),
        skipped_references,
        candidate_rows,
        skipped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(aggregation: EmbeddingAggregation) -> EmbeddingRankOptions {
        EmbeddingRankOptions {
            top_k: 10,
            aggregation,
            exclude_subscriber_id: None,
            per_reference_limit: None,
        }
    }

    fn references() -> Vec<EmbeddingValue> {
        vec![vec![1.0, 0.0].into(), vec![0.0, 1.0].into()]
    }

    fn rows() -> Vec<EmbeddingRow> {
        vec![
            EmbeddingRow::new(1, vec![1.0, 0.0]),
            EmbeddingRow::new(1, "[1.0, 1.0]"),
            EmbeddingRow::new(2, vec![0.0, 1.0]),
            EmbeddingRow::new(3, "not-json"),
        ]
    }

    fn score_of(ranking: &EmbeddingRanking, id: i64) -> Option<f64> {
        ranking
            .matches
            .iter()
            .find(|m| m.subscriber_id == id)
            .map(|m| m.score)
    }

    #[test]
    fn sum_adds_every_pair() {
        let ranking = rank_candidates(&references(), &rows(), &options(EmbeddingAggregation::Sum));

        let diag = std::f64::consts::FRAC_1_SQRT_2;
        let expected = 1.0 + 0.0 + diag + diag;
        assert!((score_of(&ranking, 1).unwrap_or_default() - expected).abs() < 1e-12);
        assert!((score_of(&ranking, 2).unwrap_or_default() - 1.0).abs() < 1e-12);
        assert_eq!(ranking.matches[0].subscriber_id, 1);
        assert_eq!(ranking.matches[0].comparisons, 4);
        assert_eq!(ranking.matches[0].matched_rows, 2);
    }

    #[test]
    fn max_and_mean_aggregate_differently() {
        let max = rank_candidates(&references(), &rows(), &options(EmbeddingAggregation::Max));
        let mean = rank_candidates(&references(), &rows(), &options(EmbeddingAggregation::Mean));

        // subscriber 1 and 2 both reach 1.0, so id breaks the tie
        assert_eq!(score_of(&max, 1), Some(1.0));
        assert_eq!(max.matches[0].subscriber_id, 1);

        let diag = std::f64::consts::FRAC_1_SQRT_2;
        let expected = (1.0 + 2.0 * diag) / 4.0;
        assert!((score_of(&mean, 1).unwrap_or_default() - expected).abs() < 1e-12);
        assert_eq!(score_of(&mean, 2), Some(0.5));
    }

    #[test]
    fn skips_bad_rows_and_references() {
        let mut refs = references();
        refs.push(EmbeddingValue::Invalid);
        let ranking = rank_candidates(&refs, &rows(), &options(EmbeddingAggregation::Sum));

        assert_eq!(ranking.skipped_rows, 1);
        assert_eq!(ranking.skipped_references, 1);
        assert_eq!(ranking.reference_count, 2);
        assert!(score_of(&ranking, 3).is_none());
    }

    #[test]
    fn excluded_subscriber_never_appears() {
        let opts = EmbeddingRankOptions {
            exclude_subscriber_id: Some(1),
            ..options(EmbeddingAggregation::Sum)
        };
        let ranking = rank_candidates(&references(), &rows(), &opts);
        assert!(ranking.matches.iter().all(|m| m.subscriber_id != 1));
        assert_eq!(ranking.candidate_rows, 2);
    }

    #[test]
    fn string_and_native_rows_rank_identically() {
        let native = vec![EmbeddingRow::new(7, vec![0.1, 0.2, 0.3])];
        let encoded = vec![EmbeddingRow::new(7, "[0.1,0.2,0.3]")];
        let refs: Vec<EmbeddingValue> = vec![vec![0.3, 0.2, 0.1].into()];
        let opts = options(EmbeddingAggregation::Sum);

        assert_eq!(
            rank_candidates(&refs, &native, &opts).matches,
            rank_candidates(&refs, &encoded, &opts).matches
        );
    }

    #[test]
    fn truncates_to_top_k() {
        let opts = EmbeddingRankOptions {
            top_k: 1,
            ..options(EmbeddingAggregation::Sum)
        };
        assert_eq!(rank_candidates(&references(), &rows(), &opts).matches.len(), 1);
    }

    #[test]
    fn per_reference_limit_favors_few_strong_rows() {
        let refs: Vec<EmbeddingValue> = vec![vec![1.0, 0.0].into()];
        let rows = vec![
            EmbeddingRow::new(1, vec![0.6, 0.8]),
            EmbeddingRow::new(1, vec![0.6, 0.8]),
            EmbeddingRow::new(1, vec![0.6, 0.8]),
            EmbeddingRow::new(2, vec![1.0, 0.0]),
        ];

        let unlimited = rank_candidates(&refs, &rows, &options(EmbeddingAggregation::Sum));
        assert_eq!(unlimited.matches[0].subscriber_id, 1);

        let limited = rank_candidates(
            &refs,
            &rows,
            &EmbeddingRankOptions {
                per_reference_limit: Some(2),
                ..options(EmbeddingAggregation::Sum)
            },
        );
        let order: Vec<i64> = limited.matches.iter().map(|m| m.subscriber_id).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(limited.matches[1].comparisons, 1);
        assert_eq!(limited.matches[1].matched_rows, 3);
    }

    #[test]
    fn subscribers_outside_every_reference_limit_drop_out() {
        let refs: Vec<EmbeddingValue> = vec![vec![1.0, 0.0].into()];
        let rows = vec![EmbeddingRow::new(1, vec![0.0, 1.0]), EmbeddingRow::new(2, vec![1.0, 0.0])];
        let ranking = rank_candidates(
            &refs,
            &rows,
            &EmbeddingRankOptions {
                per_reference_limit: Some(1),
                ..options(EmbeddingAggregation::Sum)
            },
        );

        assert_eq!(ranking.matches.len(), 1);
        assert_eq!(ranking.matches[0].subscriber_id, 2);
    }

    #[test]
    fn aggregation_parses_from_lowercase() {
        assert_eq!("mean".parse::<EmbeddingAggregation>().ok(), Some(EmbeddingAggregation::Mean));
        assert_eq!(EmbeddingAggregation::default().to_string(), "sum");
    }
}
