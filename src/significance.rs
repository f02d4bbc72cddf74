//! Permutation significance testing and bootstrap confidence intervals.
//!
//! The permutation test builds an empirical null distribution for the
//! absolute Pearson correlation by repeatedly shuffling the second series
//! with a uniform Fisher-Yates permutation. The bootstrap resamples
//! `(x_i, y_i)` pairs with replacement and reports the percentile interval
//! along with standard error and bias, mirroring how bootstrap validation
//! is reported elsewhere in this codebase's lineage.

use crate::config::{AnalysisOptions, CORRELATION_METHODS_TESTED};
use crate::correlation::pearson_raw;
use crate::descriptive::{float_total_cmp, percentile_of_sorted};
use crate::errors::{validate_data_length, StatError, StatResult};
use crate::rng::{mix_seed, AnalysisRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Cohen's conventional effect-size bands for correlations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EffectSizeClass {
    /// |r| < 0.1
    Trivial,
    /// 0.1 <= |r| < 0.3
    Small,
    /// 0.3 <= |r| < 0.5
    Medium,
    /// |r| >= 0.5
    Large,
}

impl EffectSizeClass {
    /// Classify an observed correlation magnitude.
    pub fn from_magnitude(r_abs: f64) -> Self {
        if r_abs < 0.1 {
            EffectSizeClass::Trivial
        } else if r_abs < 0.3 {
            EffectSizeClass::Small
        } else if r_abs < 0.5 {
            EffectSizeClass::Medium
        } else {
            EffectSizeClass::Large
        }
    }
}

/// Output of the permutation significance test and bootstrap.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignificanceReport {
    /// Observed Pearson correlation of the aligned series
    pub observed_correlation: f64,
    /// Empirical p-value: fraction of permuted |r| >= observed |r|
    pub p_value: f64,
    /// Bonferroni-style corrected p-value (x3 methods, capped at 1.0)
    pub corrected_p_value: f64,
    /// Number of permutations actually run
    pub permutations: usize,
    /// Percentile bootstrap confidence interval for the correlation
    pub bootstrap_ci: (f64, f64),
    /// Bootstrap standard error of the correlation
    pub bootstrap_standard_error: f64,
    /// Bootstrap bias estimate (mean resampled r minus observed r)
    pub bootstrap_bias: f64,
    /// Number of bootstrap resamples that produced a finite estimate
    pub bootstrap_samples: usize,
    /// Fisher z-transform confidence interval for the correlation
    pub fisher_z_ci: (f64, f64),
    /// Effect-size classification of the observed magnitude
    pub effect_size: EffectSizeClass,
    /// Simplified statistical power estimate via the Fisher z approximation
    pub statistical_power: f64,
}

/// Run the permutation test and pair bootstrap over aligned arrays.
///
/// Degenerate inputs (zero variance) naturally produce an observed
/// correlation of 0, a p-value of 1, and a collapsed confidence interval;
/// no special-casing is needed beyond the length check.
pub fn permutation_significance(
    x: &[f64],
    y: &[f64],
    options: &AnalysisOptions,
) -> StatResult<SignificanceReport> {
    validate_data_length(x, 3, "permutation_significance")?;
    if x.len() != y.len() {
        return Err(StatError::InvalidParameter {
            parameter: "series lengths".to_string(),
            value: y.len() as f64,
            constraint: format!("Must match first series length {}", x.len()),
        });
    }

    let n = x.len();
    let observed = pearson_raw(x, y);
    let observed_abs = observed.abs();

    // Null distribution by shuffling y; per-iteration reseeding keeps the
    // streams decorrelated and the whole run reproducible under a seed.
    let mut rng = AnalysisRng::from_option(options.seed);
    let mut shuffled = y.to_vec();
    let mut exceed_count = 0usize;
    for i in 0..options.permutations {
        if let Some(seed) = options.seed {
            rng = AnalysisRng::with_seed(mix_seed(seed, i));
        }
        shuffled.copy_from_slice(y);
        rng.shuffle(&mut shuffled);
        if pearson_raw(x, &shuffled).abs() >= observed_abs {
            exceed_count += 1;
        }
    }
    let p_value = exceed_count as f64 / options.permutations as f64;
    let corrected_p_value = (p_value * CORRELATION_METHODS_TESTED as f64).min(1.0);

    // Pair bootstrap for the percentile confidence interval. Iteration
    // seeds are offset past the permutation block so the two resampling
    // phases never share a stream.
    let mut bootstrap_estimates = Vec::with_capacity(options.bootstrap_samples);
    let mut indices = Vec::with_capacity(n);
    let mut bx = vec![0.0; n];
    let mut by = vec![0.0; n];
    for b in 0..options.bootstrap_samples {
        if let Some(seed) = options.seed {
            rng = AnalysisRng::with_seed(mix_seed(seed, options.permutations + b));
        }
        rng.resample_indices(n, &mut indices);
        for (slot, &i) in indices.iter().enumerate() {
            bx[slot] = x[i];
            by[slot] = y[i];
        }
        let estimate = pearson_raw(&bx, &by);
        if estimate.is_finite() {
            bootstrap_estimates.push(estimate);
        }
    }
    if bootstrap_estimates.is_empty() {
        return Err(StatError::NumericalError {
            reason: "No valid bootstrap estimates generated".to_string(),
            operation: Some("permutation_significance".to_string()),
        });
    }
    bootstrap_estimates.sort_by(float_total_cmp);

    let alpha = 1.0 - options.confidence_level;
    let bootstrap_ci = (
        percentile_of_sorted(&bootstrap_estimates, alpha / 2.0),
        percentile_of_sorted(&bootstrap_estimates, 1.0 - alpha / 2.0),
    );
    let boot_mean =
        bootstrap_estimates.iter().sum::<f64>() / bootstrap_estimates.len() as f64;
    let bootstrap_bias = boot_mean - observed;
    let bootstrap_standard_error = if bootstrap_estimates.len() > 1 {
        (bootstrap_estimates
            .iter()
            .map(|&r| {
                let d = r - boot_mean;
                d * d
            })
            .sum::<f64>()
            / (bootstrap_estimates.len() - 1) as f64)
            .sqrt()
    } else {
        0.0
    };

    let (fisher_z_ci, statistical_power) =
        fisher_z_inference(observed, n, options.confidence_level)?;

    Ok(SignificanceReport {
        observed_correlation: observed,
        p_value,
        corrected_p_value,
        permutations: options.permutations,
        bootstrap_ci,
        bootstrap_standard_error,
        bootstrap_bias,
        bootstrap_samples: bootstrap_estimates.len(),
        fisher_z_ci,
        effect_size: EffectSizeClass::from_magnitude(observed_abs),
        statistical_power,
    })
}

/// Fisher z confidence interval and two-sided power approximation.
///
/// Requires n >= 4 for a finite standard error `1/sqrt(n-3)`; below that
/// the interval degrades to the full [-1, 1] range and power to 0, so no
/// field ever carries a plausible-looking NaN.
fn fisher_z_inference(r: f64, n: usize, confidence_level: f64) -> StatResult<((f64, f64), f64)> {
    if n < 4 {
        return Ok(((-1.0, 1.0), 0.0));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|_| StatError::NumericalError {
        reason: "Failed to create standard normal distribution".to_string(),
        operation: Some("fisher_z_inference".to_string()),
    })?;

    // atanh diverges at |r| = 1; clamp just inside the open interval
    let r_clamped = r.clamp(-0.999_999, 0.999_999);
    let z = r_clamped.atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    let z_crit = normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);

    let ci = ((z - z_crit * se).tanh(), (z + z_crit * se).tanh());

    // Two-sided power at alpha: P(|Z| > z_crit) under the shifted null
    let lambda = z.abs() / se;
    let power = (1.0 - normal.cdf(z_crit - lambda)) + normal.cdf(-z_crit - lambda);

    Ok((ci, power.clamp(0.0, 1.0)))
}
