//! Top-N extraction from a raw score vector.

use std::cmp::Ordering;

/// Indices of the `n` highest scores with their confidences, descending.
///
/// Ties are broken by lower class index first so the ranking is
/// deterministic regardless of the sort algorithm's stability.
pub fn top_n(scores: &[f32], n: usize) -> Vec<(usize, f32)> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices
        .into_iter()
        .take(n)
        .map(|i| (i, scores[i]))
        .collect()
}

/// Index of the highest score; ties resolve to the lower index.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    top_n(scores, 1).first().map(|&(i, _)| i)
}
