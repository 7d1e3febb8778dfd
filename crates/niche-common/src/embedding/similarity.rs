/// 埋め込みベクトル同士のコサイン類似度（-1.0〜1.0）
///
/// Empty or zero-magnitude inputs give 0.0. Mismatched dimensions are logged
/// and also give 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }
    if a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// 参照ベクトル群に対する平均コサイン類似度
///
/// This is the value that feeds `SkillVector::github_similarity`. No
/// references gives 0.0.
pub fn github_similarity_for<R: AsRef<[f64]>>(candidate: &[f64], references: &[R]) -> f64 {
    if references.is_empty() {
        return 0.0;
    }

    let total: f64 = references
        .iter()
        .map(|reference| cosine_similarity(candidate, reference.as_ref()))
        .sum();
    total / references.len() as f64
}
