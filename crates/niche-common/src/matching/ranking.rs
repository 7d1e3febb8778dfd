use std::cmp::Ordering;

use super::result::MatchResult;

/// 類似度の差がこの幅以内なら「ほぼ同点」とみなし、距離の昇順で並べる
///
/// Tuning constant kept for output parity with the existing ranking; the value
/// has not been recalibrated.
pub const NEAR_TIE_BAND: f64 = 0.01;

/// Similarity descending, except that similarities within [`NEAR_TIE_BAND`]
/// of each other are ordered by distance ascending.
pub fn compare_matches(a: &MatchResult, b: &MatchResult) -> Ordering {
    if (a.similarity - b.similarity).abs() > NEAR_TIE_BAND {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    } else {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    }
}

/// Orders matches with [`compare_matches`] and keeps the first `top_k`.
///
/// The near-tie comparator is not transitive, so `slice::sort_by` (which may
/// panic on inconsistent orderings) is not usable. Binary insertion keeps the
/// result stable and guarantees every adjacent pair is correctly ordered.
///
/// The whole population is inserted before truncation, so element moves grow
/// quadratically with population size.
pub fn rank_top_k(matches: Vec<MatchResult>, top_k: usize) -> Vec<MatchResult> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<MatchResult> = Vec::with_capacity(matches.len());
    for candidate in matches {
        let position = insertion_point(&ranked, &candidate);
        ranked.insert(position, candidate);
    }

    ranked.truncate(top_k);
    ranked
}

/// First index whose element must come after `candidate`. Ties go after
/// existing elements so insertion order survives.
fn insertion_point(ranked: &[MatchResult], candidate: &MatchResult) -> usize {
    let mut low = 0;
    let mut high = ranked.len();

    while low < high {
        let mid = low + (high - low) / 2;
        if compare_matches(candidate, &ranked[mid]) == Ordering::Less {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    low
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkillVector;

    fn scored(id: &str, similarity: f64, distance: f64) -> MatchResult {
        MatchResult::new(id, &SkillVector::default(), SkillVector::default(), distance, similarity)
    }

    fn ids(matches: &[MatchResult]) -> Vec<&str> {
        matches.iter().map(|m| m.candidate_id.as_str()).collect()
    }

    #[test]
    fn orders_by_similarity_outside_tie_band() {
        let ranked = rank_top_k(
            vec![scored("low", 0.2, 0.1), scored("high", 0.9, 5.0), scored("mid", 0.5, 1.0)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["high", "mid", "low"]);
    }

    #[test]
    fn near_ties_fall_back_to_distance() {
        let ranked = rank_top_k(
            vec![scored("far", 0.905, 2.0), scored("near", 0.9, 0.5)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["near", "far"]);
    }

    #[test]
    fn difference_just_over_band_uses_similarity() {
        let ranked = rank_top_k(
            vec![scored("near", 0.88, 0.1), scored("similar", 0.9, 3.0)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["similar", "near"]);
    }

    #[test]
    fn difference_exactly_on_band_uses_distance() {
        let ranked = rank_top_k(
            vec![scored("hi_far", 0.01, 3.0), scored("lo_near", 0.0, 0.5)],
            10,
        );
        assert_eq!(0.01_f64 - 0.0, NEAR_TIE_BAND);
        assert_eq!(ids(&ranked), vec!["lo_near", "hi_far"]);
    }

    #[test]
    fn exact_ties_keep_insertion_order() {
        let ranked = rank_top_k(
            vec![scored("first", 0.5, 1.0), scored("second", 0.5, 1.0)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["first", "second"]);
    }

    #[test]
    fn truncates_to_top_k() {
        let matches = vec![scored("a", 0.9, 0.0), scored("b", 0.5, 0.0), scored("c", 0.1, 0.0)];
        assert_eq!(ids(&rank_top_k(matches.clone(), 2)), vec!["a", "b"]);
        assert!(rank_top_k(matches.clone(), 0).is_empty());
        assert_eq!(rank_top_k(matches, 99).len(), 3);
    }

    #[test]
    fn chained_near_ties_do_not_panic_and_adjacent_pairs_hold() {
        // 0.500 ~ 0.508 ~ 0.516 but 0.500 and 0.516 are outside the band.
        let matches = vec![
            scored("a", 0.500, 0.1),
            scored("b", 0.508, 0.9),
            scored("c", 0.516, 0.5),
            scored("d", 0.504, 0.3),
        ];
        let ranked = rank_top_k(matches, 4);

        assert_eq!(ranked.len(), 4);
        for pair in ranked.windows(2) {
            assert_ne!(compare_matches(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
