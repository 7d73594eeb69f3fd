//! Statistics used by threshold calculation and adaptation.
//!
//! All functions are total: degenerate inputs (too few samples, zero
//! variance, empty sets) yield `0.0` instead of NaN.

use std::collections::BTreeSet;

/// Pearson correlation between two equally long series.
///
/// Returns `0.0` with fewer than two pairs, mismatched lengths, or zero
/// variance in either series.
///
/// # Example
///
/// ```
/// use flowstate_engine::threshold::stats::pearson_correlation;
///
/// let r = pearson_correlation(&[0.1, 0.5, 0.9], &[0.0, 0.5, 1.0]);
/// assert!((r - 1.0).abs() < 1e-5);
/// assert_eq!(pearson_correlation(&[0.4], &[1.0]), 0.0);
/// ```
pub fn pearson_correlation(xs: &[f32], ys: &[f32]) -> f32 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_y = ys.iter().map(|&y| y as f64).sum::<f64>() / n;

    let mut cov = 0.0f64;
    let mut var_x = 0.0f64;
    let mut var_y = 0.0f64;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    ((cov / denom) as f32).clamp(-1.0, 1.0)
}

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`; two empty sets score `0.0`.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Mean Jaccard similarity over all unordered pairs of tag sets.
///
/// Returns `0.0` with fewer than two sets.
pub fn mean_pairwise_jaccard(sets: &[&BTreeSet<String>]) -> f32 {
    if sets.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0f32;
    let mut pairs = 0usize;
    for i in 0..sets.len() {
        for j in (i + 1)..sets.len() {
            total += jaccard(sets[i], sets[j]);
            pairs += 1;
        }
    }
    total / pairs as f32
}

/// Fraction of `true` outcomes; `0.0` for no outcomes.
pub fn success_rate(outcomes: impl IntoIterator<Item = bool>) -> f32 {
    let (hits, total) = outcomes
        .into_iter()
        .fold((0usize, 0usize), |(h, t), ok| (h + ok as usize, t + 1));
    if total == 0 {
        0.0
    } else {
        hits as f32 / total as f32
    }
}
