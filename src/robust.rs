//! Outlier-resistant correlation variants and influence measures.
//!
//! Three estimators over the same aligned arrays, plus leave-one-out
//! influence and leverage-point detection. The leverage radius
//! `2 * sqrt(var(x) + var(y))` is an ad hoc screening threshold, not a
//! calibrated statistic.

use crate::correlation::pearson_raw;
use crate::descriptive::{mad, median, sample_variance, winsorize};
use crate::errors::{validate_data_length, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Leverage-point radius multiplier.
pub const LEVERAGE_RADIUS_FACTOR: f64 = 2.0;

/// Robust correlation estimates and outlier screening results.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobustCorrelationReport {
    /// Pearson correlation of median-centered values.
    ///
    /// Pearson correlation is invariant to constant shifts, so this equals
    /// plain Pearson exactly. It is retained for parity with the method
    /// taxonomy this engine descends from, not because it adds robustness.
    pub median_centered: f64,
    /// Pearson correlation of `(v - median) / MAD` scaled values; `None`
    /// when either series has zero MAD (majority-constant data)
    pub mad_normalized: Option<f64>,
    /// Pearson correlation after clipping both series to their
    /// `[trim, 1 - trim]` quantiles
    pub winsorized: f64,
    /// Per-tail trim proportion used for the winsorized estimate
    pub winsor_trim: f64,
    /// Maximum absolute change in Pearson correlation when any single
    /// point is removed
    pub outlier_influence: f64,
    /// Index (into the aligned arrays) of the most influential point
    pub max_influence_index: Option<usize>,
    /// Indices of points beyond the leverage radius from the bivariate mean
    pub leverage_points: Vec<usize>,
}

/// Compute all robust correlation variants over aligned arrays.
pub fn robust_correlations(x: &[f64], y: &[f64], trim: f64) -> StatResult<RobustCorrelationReport> {
    validate_data_length(x, 3, "robust_correlations")?;
    if x.len() != y.len() {
        return Err(StatError::InvalidParameter {
            parameter: "series lengths".to_string(),
            value: y.len() as f64,
            constraint: format!("Must match first series length {}", x.len()),
        });
    }

    let n = x.len();
    let med_x = median(x);
    let med_y = median(y);

    let centered_x: Vec<f64> = x.iter().map(|&v| v - med_x).collect();
    let centered_y: Vec<f64> = y.iter().map(|&v| v - med_y).collect();
    let median_centered = pearson_raw(&centered_x, &centered_y);

    let mad_x = mad(x, med_x);
    let mad_y = mad(y, med_y);
    let mad_normalized = if mad_x > 0.0 && mad_y > 0.0 {
        let nx: Vec<f64> = x.iter().map(|&v| (v - med_x) / mad_x).collect();
        let ny: Vec<f64> = y.iter().map(|&v| (v - med_y) / mad_y).collect();
        Some(pearson_raw(&nx, &ny))
    } else {
        None
    };

    let wx = winsorize(x, trim)?;
    let wy = winsorize(y, trim)?;
    let winsorized = pearson_raw(&wx, &wy);

    // Leave-one-out influence, O(n^2); n is tens of points here
    let full_r = pearson_raw(x, y);
    let mut outlier_influence = 0.0;
    let mut max_influence_index = None;
    let mut loo_x = Vec::with_capacity(n - 1);
    let mut loo_y = Vec::with_capacity(n - 1);
    for skip in 0..n {
        loo_x.clear();
        loo_y.clear();
        for i in 0..n {
            if i != skip {
                loo_x.push(x[i]);
                loo_y.push(y[i]);
            }
        }
        let delta = (pearson_raw(&loo_x, &loo_y) - full_r).abs();
        if delta > outlier_influence {
            outlier_influence = delta;
            max_influence_index = Some(skip);
        }
    }

    // Leverage screening against the bivariate mean
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let radius = LEVERAGE_RADIUS_FACTOR * (sample_variance(x) + sample_variance(y)).sqrt();
    let leverage_points: Vec<usize> = (0..n)
        .filter(|&i| {
            let dx = x[i] - mean_x;
            let dy = y[i] - mean_y;
            (dx * dx + dy * dy).sqrt() > radius
        })
        .collect();

    Ok(RobustCorrelationReport {
        median_centered,
        mad_normalized,
        winsorized,
        winsor_trim: trim,
        outlier_influence,
        max_influence_index,
        leverage_points,
    })
}
