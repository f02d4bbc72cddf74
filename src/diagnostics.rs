//! Regression-assumption diagnostics over the aligned pair.
//!
//! These are screening proxies sized for short yearly series, not full
//! econometric tests: a Breusch-Pagan-style heteroscedasticity check, lag-1
//! autocorrelation, a trend-based stationarity proxy, a half-split
//! structural-break check, and the two-variable VIF.

use crate::correlation::pearson_raw;
use crate::errors::{validate_data_length, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum aligned points for the half-split structural-break proxy.
pub const MIN_STRUCTURAL_BREAK_POINTS: usize = 6;

/// Diagnostic measures for the aligned pair.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticsReport {
    /// Correlation between squared single-slope-fit residuals of y and x;
    /// large magnitude suggests heteroscedastic errors
    pub heteroscedasticity: f64,
    /// Lag-1 autocorrelation of x
    pub autocorrelation_x: f64,
    /// Lag-1 autocorrelation of y
    pub autocorrelation_y: f64,
    /// Correlation of x with the time index (trend / non-stationarity proxy)
    pub trend_x: f64,
    /// Correlation of y with the time index
    pub trend_y: f64,
    /// Absolute difference between first-half and second-half Pearson
    /// correlation; `None` below [`MIN_STRUCTURAL_BREAK_POINTS`]
    pub structural_break: Option<f64>,
    /// Two-variable variance inflation factor `1 / (1 - r²)`
    pub variance_inflation: f64,
}

/// Lag-1 autocorrelation of a series.
pub fn lag1_autocorrelation(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let denominator: f64 = values
        .iter()
        .map(|&v| {
            let d = v - mean;
            d * d
        })
        .sum();
    if denominator == 0.0 {
        return 0.0;
    }
    let numerator: f64 = values
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();
    numerator / denominator
}

/// Squared residuals of y from the single-slope OLS fit on x.
fn squared_residuals(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let sxx: f64 = x
        .iter()
        .map(|&v| {
            let d = v - mean_x;
            d * d
        })
        .sum();
    let sxy: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&a, &b)| (a - mean_x) * (b - mean_y))
        .sum();
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;
    x.iter()
        .zip(y.iter())
        .map(|(&a, &b)| {
            let r = b - (intercept + slope * a);
            r * r
        })
        .collect()
}

/// Run all diagnostics over aligned arrays.
pub fn run_diagnostics(x: &[f64], y: &[f64]) -> StatResult<DiagnosticsReport> {
    validate_data_length(x, 3, "run_diagnostics")?;
    if x.len() != y.len() {
        return Err(StatError::InvalidParameter {
            parameter: "series lengths".to_string(),
            value: y.len() as f64,
            constraint: format!("Must match first series length {}", x.len()),
        });
    }

    let n = x.len();
    let time_index: Vec<f64> = (0..n).map(|i| i as f64).collect();

    let residuals_sq = squared_residuals(x, y);
    let heteroscedasticity = pearson_raw(&residuals_sq, x);

    let structural_break = if n >= MIN_STRUCTURAL_BREAK_POINTS {
        let half = n / 2;
        let first = pearson_raw(&x[..half], &y[..half]);
        let second = pearson_raw(&x[half..], &y[half..]);
        Some((first - second).abs())
    } else {
        None
    };

    let r = pearson_raw(x, y);
    // r² of 1 makes the VIF formally infinite; clamp the denominator so the
    // field stays a finite, orderable number
    let variance_inflation = 1.0 / (1.0 - r * r).max(1e-12);

    Ok(DiagnosticsReport {
        heteroscedasticity,
        autocorrelation_x: lag1_autocorrelation(x),
        autocorrelation_y: lag1_autocorrelation(y),
        trend_x: pearson_raw(x, &time_index),
        trend_y: pearson_raw(y, &time_index),
        structural_break,
        variance_inflation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_lag1_autocorrelation_trending() {
        // A monotone trend is strongly autocorrelated at lag 1
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(lag1_autocorrelation(&x) > 0.8);
    }

    #[test]
    fn test_lag1_autocorrelation_alternating() {
        let x: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(lag1_autocorrelation(&x) < -0.8);
    }

    #[test]
    fn test_lag1_autocorrelation_constant() {
        assert_eq!(lag1_autocorrelation(&[3.0; 10]), 0.0);
    }

    #[test]
    fn test_trend_proxy() {
        let x: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 1.0).collect();
        let y = vec![3.0, -1.0, 2.0, 0.0, 1.0, -2.0, 3.0, 1.0, -1.0, 0.0];
        let report = run_diagnostics(&x, &y).unwrap();
        assert_approx_eq!(report.trend_x, 1.0, 1e-12);
        assert!(report.trend_y.abs() < 0.6);
    }

    #[test]
    fn test_structural_break_detected() {
        // Positive relationship in the first half, negative in the second
        let x: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let y = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
        let report = run_diagnostics(&x, &y).unwrap();
        let break_size = report.structural_break.unwrap();
        assert!(break_size > 1.5, "break size {}", break_size);
    }

    #[test]
    fn test_structural_break_requires_six_points() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let report = run_diagnostics(&x, &y).unwrap();
        assert!(report.structural_break.is_none());
    }

    #[test]
    fn test_vif_uncorrelated_near_one() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = vec![4.0, 1.0, 5.0, 2.0, 6.0, 3.0];
        let report = run_diagnostics(&x, &y).unwrap();
        assert!(report.variance_inflation < 2.0);
    }

    #[test]
    fn test_vif_perfect_correlation_large_finite() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let report = run_diagnostics(&x, &y).unwrap();
        assert!(report.variance_inflation > 1e6);
        assert!(report.variance_inflation.is_finite());
    }

    #[test]
    fn test_heteroscedasticity_fanning_residuals() {
        // Residual magnitude grows with x: squared residuals correlate with x
        let x: Vec<f64> = (1..=16).map(|i| i as f64).collect();
        let noise = [
            0.1, -0.1, 0.2, -0.2, 0.5, -0.5, 0.9, -0.9, 1.4, -1.4, 2.0, -2.0, 2.7, -2.7, 3.5,
            -3.5,
        ];
        let y: Vec<f64> = x
            .iter()
            .zip(noise.iter())
            .map(|(&v, &e)| 2.0 * v + e)
            .collect();
        let report = run_diagnostics(&x, &y).unwrap();
        assert!(
            report.heteroscedasticity > 0.5,
            "heteroscedasticity proxy {}",
            report.heteroscedasticity
        );
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            run_diagnostics(&[1.0, 2.0], &[1.0, 2.0]),
            Err(StatError::InsufficientData { .. })
        ));
    }
}
