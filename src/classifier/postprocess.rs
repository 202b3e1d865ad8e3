use std::cmp::Ordering;

use super::{LabelMap, Prediction};

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum == 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }

    exps.into_iter().map(|e| e / sum).collect()
}

/// The `k` most probable classes, highest first. Equal probabilities keep
/// the lower class index first.
#[must_use]
pub fn top_k(probs: &[f32], labels: &LabelMap, k: usize) -> Vec<Prediction> {
    let mut indexed: Vec<(usize, f32)> = probs.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    indexed
        .into_iter()
        .take(k)
        .map(|(idx, prob)| Prediction {
            label: labels.get(idx).unwrap_or("Unknown").to_string(),
            prob,
        })
        .collect()
}

/// `fresh_prob` as a percentage rounded to two decimals, clamped to [0, 100].
#[must_use]
pub fn freshness_score(fresh_prob: f32) -> f64 {
    let pct = (f64::from(fresh_prob) * 100.0).clamp(0.0, 100.0);
    (pct * 100.0).round() / 100.0
}
