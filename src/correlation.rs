//! Core correlation formulas: Pearson, Spearman, Kendall's tau.
//!
//! All three return a [`CorrelationEstimate`] whose `degenerate` flag
//! distinguishes "no linear relationship" from "no variance to measure".
//! By convention a degenerate estimate carries coefficient 0.0.

use crate::descriptive::average_ranks;
use crate::errors::{validate_data_length, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A correlation coefficient together with a degeneracy flag.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrelationEstimate {
    /// Coefficient in [-1, 1]; 0.0 when degenerate
    pub coefficient: f64,
    /// True when at least one input had zero variance, making the
    /// coefficient unmeasurable rather than genuinely zero
    pub degenerate: bool,
}

impl CorrelationEstimate {
    fn measured(coefficient: f64) -> Self {
        Self {
            coefficient,
            degenerate: false,
        }
    }

    fn degenerate() -> Self {
        Self {
            coefficient: 0.0,
            degenerate: true,
        }
    }
}

fn check_paired_lengths(x: &[f64], y: &[f64], operation: &str) -> StatResult<()> {
    if x.len() != y.len() {
        return Err(StatError::InvalidParameter {
            parameter: "series lengths".to_string(),
            value: y.len() as f64,
            constraint: format!("Must match first series length {}", x.len()),
        });
    }
    validate_data_length(x, 2, operation)
}

/// Pearson correlation without the Result wrapper, for resampling hot loops.
///
/// Returns 0.0 on zero variance or fewer than two points; callers that need
/// to distinguish those cases use [`pearson`].
pub(crate) fn pearson_raw(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / nf;
    let mean_y = y[..n].iter().sum::<f64>() / nf;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    // Clamp: accumulated rounding can push |r| epsilon past 1
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Pearson product-moment correlation.
///
/// # Errors
/// * [`StatError::InsufficientData`] for fewer than two points
/// * [`StatError::InvalidParameter`] for mismatched lengths
pub fn pearson(x: &[f64], y: &[f64]) -> StatResult<CorrelationEstimate> {
    check_paired_lengths(x, y, "pearson")?;
    if has_zero_variance(x) || has_zero_variance(y) {
        return Ok(CorrelationEstimate::degenerate());
    }
    Ok(CorrelationEstimate::measured(pearson_raw(x, y)))
}

/// Spearman rank correlation: Pearson over average-tie ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> StatResult<CorrelationEstimate> {
    check_paired_lengths(x, y, "spearman")?;
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    // All-tied input ranks are constant, which is the same degeneracy
    if has_zero_variance(&rx) || has_zero_variance(&ry) {
        return Ok(CorrelationEstimate::degenerate());
    }
    Ok(CorrelationEstimate::measured(pearson_raw(&rx, &ry)))
}

/// Kendall's tau-a via pairwise concordance counting.
///
/// O(n²) over all unordered pairs, which is fine at this engine's scale
/// (tens of yearly observations). Tied pairs count as neither concordant
/// nor discordant.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> StatResult<CorrelationEstimate> {
    check_paired_lengths(x, y, "kendall_tau")?;
    if has_zero_variance(x) || has_zero_variance(y) {
        return Ok(CorrelationEstimate::degenerate());
    }

    let n = x.len();
    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let product = (x[i] - x[j]) * (y[i] - y[j]);
            if product > 0.0 {
                concordant += 1;
            } else if product < 0.0 {
                discordant += 1;
            }
        }
    }

    let total_pairs = (n * (n - 1) / 2) as f64;
    Ok(CorrelationEstimate::measured(
        (concordant - discordant) as f64 / total_pairs,
    ))
}

fn has_zero_variance(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}
