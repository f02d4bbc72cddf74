//! Basic statistical primitives shared by every analysis module.
//!
//! These are the leaves of the dependency graph: means, variances,
//! coefficient of variation, medians, MAD, percentiles, ranking, and
//! winsorization. Everything operates on plain `&[f64]` slices.

use crate::errors::{StatError, StatResult};

/// Values whose mean magnitude falls below this cannot support a stable
/// coefficient of variation.
pub const CV_MEAN_EPSILON: f64 = 1e-12;

/// Safe comparison for floating point values (pushes NaN to the end).
pub fn float_total_cmp(a: &f64, b: &f64) -> std::cmp::Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap(),
    }
}

/// Arithmetic mean. Returns NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected sample variance (ddof = 1). Zero for fewer than two
/// points.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values
        .iter()
        .map(|&v| {
            let d = v - m;
            d * d
        })
        .sum::<f64>()
        / (values.len() - 1) as f64
}

/// Sample standard deviation.
pub fn standard_deviation(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Coefficient of variation: `stddev / |mean|`.
///
/// # Errors
/// [`StatError::NumericalError`] when `|mean|` is below [`CV_MEAN_EPSILON`];
/// a CV against a near-zero mean is meaningless and would blow up silently.
pub fn coefficient_of_variation(values: &[f64]) -> StatResult<f64> {
    let m = mean(values);
    if !m.is_finite() || m.abs() < CV_MEAN_EPSILON {
        return Err(StatError::NumericalError {
            reason: format!("Mean magnitude {} too small for coefficient of variation", m),
            operation: Some("coefficient_of_variation".to_string()),
        });
    }
    Ok(standard_deviation(values) / m.abs())
}

/// Median of already-sorted data (handles even length correctly).
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Median (handles even length correctly).
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut v = values.to_vec();
    v.sort_by(float_total_cmp);
    median_of_sorted(&v)
}

/// Median absolute deviation from the given center.
pub fn mad(values: &[f64], center: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut abs_devs: Vec<f64> = values.iter().map(|&x| (x - center).abs()).collect();
    abs_devs.sort_by(float_total_cmp);
    median_of_sorted(&abs_devs)
}

/// Percentile of sorted data using linear interpolation, `p` in [0, 1].
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return sorted[0];
    }
    if p >= 1.0 {
        return sorted[sorted.len() - 1];
    }
    let index = p * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// 1-based ranks with ties receiving the average of their positional ranks.
///
/// Average-tie ranking keeps Spearman correlation exact in the presence of
/// ties, unlike positional ranking which depends on input order.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| float_total_cmp(&values[a], &values[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        // Extend over the run of tied values starting at sorted position i
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Clip values to their `[trim, 1 - trim]` sample quantiles.
///
/// # Errors
/// [`StatError::InvalidParameter`] if `trim` is outside `[0, 0.5)`.
pub fn winsorize(values: &[f64], trim: f64) -> StatResult<Vec<f64>> {
    if !(0.0..0.5).contains(&trim) {
        return Err(StatError::InvalidParameter {
            parameter: "trim".to_string(),
            value: trim,
            constraint: "Must be in [0, 0.5)".to_string(),
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(float_total_cmp);
    let lo = percentile_of_sorted(&sorted, trim);
    let hi = percentile_of_sorted(&sorted, 1.0 - trim);
    Ok(values.iter().map(|&v| v.clamp(lo, hi)).collect())
}
