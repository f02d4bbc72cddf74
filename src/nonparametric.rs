//! Non-parametric tests and normality checks.
//!
//! The Mann-Whitney and Kolmogorov-Smirnov tests here treat the two aligned
//! series as two *independent samples* and test for a location or
//! distribution difference between them. That is a different null
//! hypothesis than correlation between paired observations; their results
//! describe how dissimilar the two variables' value distributions are, not
//! how related the pairs are.
//!
//! Normality is assessed two ways: a simplified Shapiro-Wilk-style
//! statistic using a flat `1/sqrt(n)` weight (a deliberate approximation of
//! the true coefficient table, kept for lineage parity) and a proper
//! Jarque-Bera test, which is the one the aggregator trusts when the two
//! disagree.

use crate::descriptive::{average_ranks, float_total_cmp, mean, sample_variance};
use crate::errors::{validate_data_length, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// A test statistic with its p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TestStatistic {
    /// Value of the test statistic
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Results of all non-parametric tests over the aligned series.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NonParametricReport {
    /// Mann-Whitney U location test between the two value distributions
    pub mann_whitney: TestStatistic,
    /// Two-sample Kolmogorov-Smirnov distribution test
    pub kolmogorov_smirnov: TestStatistic,
    /// Simplified Shapiro-Wilk-style normality statistic for x (higher is
    /// more normal; approximate, see module docs)
    pub shapiro_proxy_x: f64,
    /// Simplified Shapiro-Wilk-style normality statistic for y
    pub shapiro_proxy_y: f64,
    /// Jarque-Bera normality test for x
    pub jarque_bera_x: TestStatistic,
    /// Jarque-Bera normality test for y
    pub jarque_bera_y: TestStatistic,
}

fn standard_normal() -> StatResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|_| StatError::NumericalError {
        reason: "Failed to create standard normal distribution".to_string(),
        operation: Some("nonparametric".to_string()),
    })
}

/// Mann-Whitney U test via pooled average ranks with tie correction and a
/// normal approximation for the p-value.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> StatResult<TestStatistic> {
    validate_data_length(x, 2, "mann_whitney_u")?;
    validate_data_length(y, 2, "mann_whitney_u")?;

    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let n = n1 + n2;

    let mut pooled: Vec<f64> = Vec::with_capacity(x.len() + y.len());
    pooled.extend_from_slice(x);
    pooled.extend_from_slice(y);
    let ranks = average_ranks(&pooled);

    let r1: f64 = ranks[..x.len()].iter().sum();
    let u1 = r1 - n1 * (n1 + 1.0) / 2.0;

    // Tie correction from runs of equal pooled values
    let mut sorted = pooled.clone();
    sorted.sort_by(float_total_cmp);
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j + 1 < sorted.len() && sorted[j + 1] == sorted[i] {
            j += 1;
        }
        let t = (j - i + 1) as f64;
        if t > 1.0 {
            tie_term += t * t * t - t;
        }
        i = j + 1;
    }

    let mu = n1 * n2 / 2.0;
    let sigma_sq = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if sigma_sq <= 0.0 {
        // Every pooled value tied: no location information at all
        return Ok(TestStatistic {
            statistic: u1,
            p_value: 1.0,
        });
    }

    let z = (u1 - mu) / sigma_sq.sqrt();
    let normal = standard_normal()?;
    let p_value = (2.0 * (1.0 - normal.cdf(z.abs()))).clamp(0.0, 1.0);

    Ok(TestStatistic {
        statistic: u1,
        p_value,
    })
}

/// Two-sample Kolmogorov-Smirnov statistic (max absolute ECDF difference)
/// with the asymptotic Kolmogorov p-value.
pub fn kolmogorov_smirnov(x: &[f64], y: &[f64]) -> StatResult<TestStatistic> {
    validate_data_length(x, 2, "kolmogorov_smirnov")?;
    validate_data_length(y, 2, "kolmogorov_smirnov")?;

    let mut sx = x.to_vec();
    let mut sy = y.to_vec();
    sx.sort_by(float_total_cmp);
    sy.sort_by(float_total_cmp);

    let n1 = sx.len();
    let n2 = sy.len();
    let mut d_max: f64 = 0.0;
    let mut i = 0;
    let mut j = 0;
    while i < n1 && j < n2 {
        let v = sx[i].min(sy[j]);
        while i < n1 && sx[i] <= v {
            i += 1;
        }
        while j < n2 && sy[j] <= v {
            j += 1;
        }
        let diff = (i as f64 / n1 as f64 - j as f64 / n2 as f64).abs();
        d_max = d_max.max(diff);
    }

    let ne = (n1 * n2) as f64 / (n1 + n2) as f64;
    let lambda = (ne.sqrt() + 0.12 + 0.11 / ne.sqrt()) * d_max;
    let p_value = kolmogorov_tail(lambda);

    Ok(TestStatistic {
        statistic: d_max,
        p_value,
    })
}

/// Asymptotic Kolmogorov distribution tail `Q(λ) = 2 Σ (-1)^{k-1} e^{-2k²λ²}`.
fn kolmogorov_tail(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let term = (-2.0 * (k * k) as f64 * lambda * lambda).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Simplified Shapiro-Wilk-style normality statistic.
///
/// Uses a flat `1/sqrt(n)` weight over symmetric order-statistic ranges in
/// place of the true Shapiro-Wilk coefficient table. Values near 1 suggest
/// normality; this is a screening proxy, not the textbook test — see
/// [`jarque_bera`] for the rigorous check.
pub fn shapiro_wilk_proxy(values: &[f64]) -> StatResult<f64> {
    validate_data_length(values, 3, "shapiro_wilk_proxy")?;
    let n = values.len();
    let mut sorted = values.to_vec();
    sorted.sort_by(float_total_cmp);

    let weight = 1.0 / (n as f64).sqrt();
    let mut b = 0.0;
    for i in 0..n / 2 {
        b += weight * (sorted[n - 1 - i] - sorted[i]);
    }

    let ss: f64 = {
        let m = mean(values);
        values
            .iter()
            .map(|&v| {
                let d = v - m;
                d * d
            })
            .sum()
    };
    if ss <= 0.0 {
        // Constant data: trivially "normal" is misleading, report 0
        return Ok(0.0);
    }
    Ok(((b * b) / ss).clamp(0.0, 1.0))
}

/// Jarque-Bera normality test: `JB = n/6 (S² + K²/4)` against chi-squared
/// with two degrees of freedom.
pub fn jarque_bera(values: &[f64]) -> StatResult<TestStatistic> {
    validate_data_length(values, 4, "jarque_bera")?;
    let n = values.len() as f64;
    let m = mean(values);
    let variance = sample_variance(values) * (n - 1.0) / n; // MLE variance
    if variance <= 0.0 {
        return Ok(TestStatistic {
            statistic: 0.0,
            p_value: 1.0,
        });
    }
    let std = variance.sqrt();
    let skewness = values
        .iter()
        .map(|&v| ((v - m) / std).powi(3))
        .sum::<f64>()
        / n;
    let kurtosis_excess = values
        .iter()
        .map(|&v| ((v - m) / std).powi(4))
        .sum::<f64>()
        / n
        - 3.0;

    let jb = n / 6.0 * (skewness * skewness + kurtosis_excess * kurtosis_excess / 4.0);
    let chi2 = ChiSquared::new(2.0).map_err(|_| StatError::NumericalError {
        reason: "Failed to create chi-squared distribution".to_string(),
        operation: Some("jarque_bera".to_string()),
    })?;
    let p_value = (1.0 - chi2.cdf(jb)).clamp(0.0, 1.0);

    Ok(TestStatistic {
        statistic: jb,
        p_value,
    })
}

/// Run the full non-parametric battery over aligned arrays.
pub fn nonparametric_tests(x: &[f64], y: &[f64]) -> StatResult<NonParametricReport> {
    validate_data_length(x, 4, "nonparametric_tests")?;
    validate_data_length(y, 4, "nonparametric_tests")?;
    Ok(NonParametricReport {
        mann_whitney: mann_whitney_u(x, y)?,
        kolmogorov_smirnov: kolmogorov_smirnov(x, y)?,
        shapiro_proxy_x: shapiro_wilk_proxy(x)?,
        shapiro_proxy_y: shapiro_wilk_proxy(y)?,
        jarque_bera_x: jarque_bera(x)?,
        jarque_bera_y: jarque_bera(y)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mann_whitney_identical_samples() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = mann_whitney_u(&x, &x).unwrap();
        assert!(result.p_value > 0.9, "p = {}", result.p_value);
    }

    #[test]
    fn test_mann_whitney_clearly_shifted() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y: Vec<f64> = x.iter().map(|&v| v + 100.0).collect();
        let result = mann_whitney_u(&x, &y).unwrap();
        assert!(result.p_value < 0.01, "p = {}", result.p_value);
    }

    #[test]
    fn test_mann_whitney_all_tied() {
        let x = vec![5.0, 5.0, 5.0];
        let y = vec![5.0, 5.0, 5.0];
        let result = mann_whitney_u(&x, &y).unwrap();
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_ks_identical_samples() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = kolmogorov_smirnov(&x, &x).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert!(result.p_value > 0.99);
    }

    #[test]
    fn test_ks_disjoint_supports() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let y: Vec<f64> = x.iter().map(|&v| v + 1000.0).collect();
        let result = kolmogorov_smirnov(&x, &y).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_ks_p_value_bounds_randomized() {
        let mut rng = crate::rng::AnalysisRng::with_seed(77);
        for _ in 0..100 {
            let n = rng.usize(2..25);
            let x: Vec<f64> = (0..n).map(|_| rng.f64() * 10.0).collect();
            let y: Vec<f64> = (0..n).map(|_| rng.f64() * 10.0).collect();
            let result = kolmogorov_smirnov(&x, &y).unwrap();
            assert!((0.0..=1.0).contains(&result.p_value));
            assert!((0.0..=1.0).contains(&result.statistic));
        }
    }

    #[test]
    fn test_shapiro_proxy_bounds() {
        let x = vec![2.1, 3.4, 1.9, 2.8, 3.0, 2.5, 2.2, 3.1];
        let w = shapiro_wilk_proxy(&x).unwrap();
        assert!((0.0..=1.0).contains(&w));
    }

    #[test]
    fn test_shapiro_proxy_constant_data() {
        let x = vec![4.0, 4.0, 4.0, 4.0];
        assert_eq!(shapiro_wilk_proxy(&x).unwrap(), 0.0);
    }

    #[test]
    fn test_jarque_bera_symmetric_data_not_rejected() {
        // Symmetric light-tailed data should not reject normality
        let x = vec![
            -2.0, -1.5, -1.0, -0.5, -0.2, 0.0, 0.2, 0.5, 1.0, 1.5, 2.0, -0.8, 0.8, -0.3, 0.3,
        ];
        let result = jarque_bera(&x).unwrap();
        assert!(result.p_value > 0.05, "p = {}", result.p_value);
    }

    #[test]
    fn test_jarque_bera_skewed_data_rejected() {
        // Strong exponential skew
        let x: Vec<f64> = (0..40).map(|i| (0.3 * i as f64).exp()).collect();
        let result = jarque_bera(&x).unwrap();
        assert!(result.p_value < 0.05, "p = {}", result.p_value);
    }

    #[test]
    fn test_battery_minimum_size() {
        let x = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            nonparametric_tests(&x, &x),
            Err(StatError::InsufficientData { .. })
        ));
    }
}
