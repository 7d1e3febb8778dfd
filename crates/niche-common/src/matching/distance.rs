use super::{dimensions::SkillDimension, weights::SkillWeights};
use crate::SkillVector;

/// 重み付き二乗平均平方根距離
///
/// `sqrt(Σ w_d (a_d - b_d)² / Σ w_d)` over all four dimensions. `None` weighs
/// every dimension 1.0. Callers must reject weight maps that sum to zero via
/// [`SkillWeights::validate`]; such a map yields NaN here.
pub fn weighted_distance(a: &SkillVector, b: &SkillVector, weights: Option<&SkillWeights>) -> f64 {
    let uniform = SkillWeights::uniform();
    let weights = weights.unwrap_or(&uniform);

    let mut sum = 0.0;
    let mut total_weight = 0.0;
    for dimension in SkillDimension::ALL {
        let weight = weights.weight(dimension);
        sum += weight * (a.get(dimension) - b.get(dimension)).powi(2);
        total_weight += weight;
    }

    (sum / total_weight).sqrt()
}

/// コサイン類似度（-1.0〜1.0）。どちらかがゼロベクトルなら 0.0
pub fn cosine_similarity(a: &SkillVector, b: &SkillVector) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for dimension in SkillDimension::ALL {
        let x = a.get(dimension);
        let y = b.get(dimension);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let magnitude = norm_a.sqrt() * norm_b.sqrt();
    if magnitude > 0.0 { dot / magnitude } else { 0.0 }
}
