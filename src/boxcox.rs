//! Box-Cox transformation analysis.
//!
//! Finds a per-series power transform lambda by coarse grid search over the
//! profile Gaussian log-likelihood, applies it, and reports whether the
//! transform materially changes the correlation structure. The
//! `transformation_needed` flag combines a likelihood-ratio test against
//! the identity transform with a correlation-weakening check; the OR of the
//! two is a documented heuristic carried over from the engine's lineage,
//! not a derived criterion.

use crate::correlation::pearson_raw;
use crate::descriptive::float_total_cmp;
use crate::errors::{validate_data_length, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Chi-squared critical value at alpha = 0.05 with one degree of freedom.
pub const CHI2_CRITICAL_1DF: f64 = 3.84;

/// Relative correlation weakening that flags the transform as needed.
pub const CORRELATION_WEAKENING_THRESHOLD: f64 = 0.10;

/// Grid bounds and step for the lambda search.
const LAMBDA_MIN: f64 = -2.0;
const LAMBDA_STEP: f64 = 0.1;
const LAMBDA_STEPS: usize = 41; // [-2.0, 2.0] inclusive

/// Result of the Box-Cox transformation analysis over both series.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxCoxReport {
    /// Optimal lambda for the first series
    pub lambda_x: f64,
    /// Optimal lambda for the second series
    pub lambda_y: f64,
    /// Positivity shift applied to the first series (0 when unneeded)
    pub shift_x: f64,
    /// Positivity shift applied to the second series (0 when unneeded)
    pub shift_y: f64,
    /// Pearson correlation of the untransformed series
    pub original_correlation: f64,
    /// Pearson correlation after transforming both series
    pub transformed_correlation: f64,
    /// Largest per-series likelihood-ratio statistic against lambda = 1
    pub likelihood_ratio: f64,
    /// Whether the LR test or the weakening check recommends transforming
    pub transformation_needed: bool,
    /// QQ-plot correlation of the transformed first series against normal
    /// quantiles (1.0 = perfectly normal)
    pub qq_correlation_x: f64,
    /// QQ-plot correlation of the transformed second series
    pub qq_correlation_y: f64,
}

/// Apply the Box-Cox transform with the given lambda to strictly positive
/// values.
///
/// `(x^λ - 1)/λ` for λ ≠ 0, `ln(x)` at λ = 0.
///
/// # Errors
/// [`StatError::DomainViolation`] if any value is not strictly positive.
pub fn box_cox_transform(values: &[f64], lambda: f64) -> StatResult<Vec<f64>> {
    if let Some(&bad) = values.iter().find(|&&v| v <= 0.0) {
        return Err(StatError::DomainViolation {
            reason: format!("Box-Cox requires strictly positive values, got {}", bad),
        });
    }
    Ok(values
        .iter()
        .map(|&v| {
            if lambda.abs() < 1e-10 {
                v.ln()
            } else {
                (v.powf(lambda) - 1.0) / lambda
            }
        })
        .collect())
}

/// Shift needed to make every value strictly positive: `|min| + 1` when the
/// minimum is at or below zero, otherwise 0.
fn positivity_shift(values: &[f64]) -> f64 {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    if min <= 0.0 {
        min.abs() + 1.0
    } else {
        0.0
    }
}

/// Profile Gaussian log-likelihood of Box-Cox-transformed values, including
/// the Jacobian term `(λ - 1) Σ ln x`.
fn box_cox_log_likelihood(positive: &[f64], lambda: f64) -> StatResult<f64> {
    let transformed = box_cox_transform(positive, lambda)?;
    let n = transformed.len() as f64;
    let mean = transformed.iter().sum::<f64>() / n;
    let var_mle = transformed
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    if var_mle <= 0.0 {
        // Constant after transform; likelihood unbounded, treat as unusable
        return Err(StatError::NumericalError {
            reason: "Zero variance after Box-Cox transform".to_string(),
            operation: Some("box_cox_log_likelihood".to_string()),
        });
    }
    let log_jacobian: f64 = positive.iter().map(|&v| v.ln()).sum();
    Ok(-0.5 * n * var_mle.ln() + (lambda - 1.0) * log_jacobian)
}

/// Grid-search the lambda maximizing the profile log-likelihood over
/// [-2, 2] in steps of 0.1. Returns `(lambda, llf_at_lambda, llf_at_one)`.
fn optimal_lambda(positive: &[f64]) -> StatResult<(f64, f64, f64)> {
    let mut best_lambda = 1.0;
    let mut best_llf = f64::NEG_INFINITY;
    let mut llf_at_one = f64::NEG_INFINITY;
    for step in 0..LAMBDA_STEPS {
        let lambda = LAMBDA_MIN + LAMBDA_STEP * step as f64;
        let llf = match box_cox_log_likelihood(positive, lambda) {
            Ok(v) if v.is_finite() => v,
            _ => continue,
        };
        if (lambda - 1.0).abs() < 1e-9 {
            llf_at_one = llf;
        }
        if llf > best_llf {
            best_llf = llf;
            best_lambda = lambda;
        }
    }
    if !best_llf.is_finite() {
        return Err(StatError::NumericalError {
            reason: "No finite Box-Cox likelihood on the lambda grid".to_string(),
            operation: Some("optimal_lambda".to_string()),
        });
    }
    if !llf_at_one.is_finite() {
        llf_at_one = best_llf;
    }
    Ok((best_lambda, best_llf, llf_at_one))
}

/// Correlation between sorted sample values and theoretical standard normal
/// quantiles; a cheap QQ-plot normality proxy in [roughly 0, 1].
fn qq_normality_correlation(values: &[f64]) -> StatResult<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|_| StatError::NumericalError {
        reason: "Failed to create standard normal distribution".to_string(),
        operation: Some("qq_normality_correlation".to_string()),
    })?;
    let mut sorted = values.to_vec();
    sorted.sort_by(float_total_cmp);
    let n = sorted.len();
    let quantiles: Vec<f64> = (0..n)
        .map(|i| normal.inverse_cdf((i as f64 + 0.5) / n as f64))
        .collect();
    Ok(pearson_raw(&sorted, &quantiles))
}

/// Run the full Box-Cox analysis over a pair of aligned series.
pub fn box_cox_analysis(x: &[f64], y: &[f64]) -> StatResult<BoxCoxReport> {
    validate_data_length(x, 3, "box_cox_analysis")?;
    validate_data_length(y, 3, "box_cox_analysis")?;

    let shift_x = positivity_shift(x);
    let shift_y = positivity_shift(y);
    let px: Vec<f64> = x.iter().map(|&v| v + shift_x).collect();
    let py: Vec<f64> = y.iter().map(|&v| v + shift_y).collect();
    // Shift arithmetic guarantees positivity for finite input; a residual
    // non-positive value means the input itself was pathological.
    if px.iter().chain(py.iter()).any(|&v| v <= 0.0) {
        return Err(StatError::DomainViolation {
            reason: "Series remains non-positive after shift correction".to_string(),
        });
    }

    let (lambda_x, llf_x, llf_x_one) = optimal_lambda(&px)?;
    let (lambda_y, llf_y, llf_y_one) = optimal_lambda(&py)?;

    let tx = box_cox_transform(&px, lambda_x)?;
    let ty = box_cox_transform(&py, lambda_y)?;

    let original_correlation = pearson_raw(x, y);
    let transformed_correlation = pearson_raw(&tx, &ty);

    let likelihood_ratio = (2.0 * (llf_x - llf_x_one)).max(2.0 * (llf_y - llf_y_one));
    let weakened = transformed_correlation.abs()
        < original_correlation.abs() * (1.0 - CORRELATION_WEAKENING_THRESHOLD);
    let transformation_needed = likelihood_ratio > CHI2_CRITICAL_1DF || weakened;

    Ok(BoxCoxReport {
        lambda_x,
        lambda_y,
        shift_x,
        shift_y,
        original_correlation,
        transformed_correlation,
        likelihood_ratio,
        transformation_needed,
        qq_correlation_x: qq_normality_correlation(&tx)?,
        qq_correlation_y: qq_normality_correlation(&ty)?,
    })
}
