//! Common-denominator spurious-correlation analysis.
//!
//! Implements Pearson's 1897 closed-form for the correlation induced between
//! two ratios `x/z` and `y/z` that share a denominator `z`, driven entirely
//! by coefficients of variation and mean signs. The `V(1/z²)` term is
//! approximated by `Vz²` (the squared CV of z) throughout; this substitution
//! is part of the contract, not a shortcut to tighten later.
//!
//! Risk thresholds and their narrative labels are exposed as data
//! ([`SpuriousRiskLevel`] plus the named constants) so callers can render or
//! re-band them without string parsing.

use crate::descriptive::{coefficient_of_variation, mean, standard_deviation};
use crate::errors::{validate_data_length, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// |induced r| below this is low risk.
pub const RISK_MEDIUM_THRESHOLD: f64 = 0.3;
/// |induced r| below this (and at/above medium) is medium risk.
pub const RISK_HIGH_THRESHOLD: f64 = 0.5;
/// |induced r| at/above this is critical risk.
pub const RISK_CRITICAL_THRESHOLD: f64 = 0.7;

/// Rolling-CV relative dispersion above which the series is flagged
/// unstable, escalating the risk band by one level. Heuristic constant.
pub const ROLLING_CV_INSTABILITY: f64 = 0.5;

/// Risk band for the common-denominator effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpuriousRiskLevel {
    /// |r| < 0.3
    Low,
    /// 0.3 <= |r| < 0.5
    Medium,
    /// 0.5 <= |r| < 0.7
    High,
    /// |r| >= 0.7
    Critical,
}

impl SpuriousRiskLevel {
    /// Band an induced-correlation magnitude.
    pub fn from_magnitude(r_abs: f64) -> Self {
        if r_abs < RISK_MEDIUM_THRESHOLD {
            SpuriousRiskLevel::Low
        } else if r_abs < RISK_HIGH_THRESHOLD {
            SpuriousRiskLevel::Medium
        } else if r_abs < RISK_CRITICAL_THRESHOLD {
            SpuriousRiskLevel::High
        } else {
            SpuriousRiskLevel::Critical
        }
    }

    /// One band worse, saturating at Critical.
    pub fn escalated(self) -> Self {
        match self {
            SpuriousRiskLevel::Low => SpuriousRiskLevel::Medium,
            SpuriousRiskLevel::Medium => SpuriousRiskLevel::High,
            _ => SpuriousRiskLevel::Critical,
        }
    }

    /// Short interpretation for display layers.
    pub fn interpretation(self) -> &'static str {
        match self {
            SpuriousRiskLevel::Low => {
                "Little of the observed correlation is attributable to a shared denominator"
            }
            SpuriousRiskLevel::Medium => {
                "A shared denominator could account for a noticeable part of the correlation"
            }
            SpuriousRiskLevel::High => {
                "A shared denominator alone could produce most of the observed correlation"
            }
            SpuriousRiskLevel::Critical => {
                "The observed correlation is consistent with a pure common-denominator artifact"
            }
        }
    }

    /// Suggested follow-up for display layers.
    pub fn recommendation(self) -> &'static str {
        match self {
            SpuriousRiskLevel::Low => "No denominator adjustment needed",
            SpuriousRiskLevel::Medium => {
                "Check whether both variables are ratios over a common base"
            }
            SpuriousRiskLevel::High => {
                "Re-run the analysis on the raw numerators before trusting this correlation"
            }
            SpuriousRiskLevel::Critical => {
                "Treat this correlation as an artifact unless numerator-level data confirms it"
            }
        }
    }
}

/// Result of the common-denominator analysis.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpuriousCorrelationReport {
    /// Induced correlation predicted by Pearson's formula, in [-1, 1]
    pub induced_correlation: f64,
    /// Static coefficient of variation of x
    pub cv_x: f64,
    /// Static coefficient of variation of y
    pub cv_y: f64,
    /// Static coefficient of variation of the candidate denominator z
    pub cv_z: f64,
    /// Final risk band (after any instability escalation)
    pub risk: SpuriousRiskLevel,
    /// Rolling-window CV sequence for x
    pub rolling_cv_x: Vec<f64>,
    /// Rolling-window CV sequence for y
    pub rolling_cv_y: Vec<f64>,
    /// True when a rolling-CV sequence was unstable enough to escalate risk
    pub cv_unstable: bool,
}

/// Pearson's 1897 induced correlation between `x/z` and `y/z` from the
/// coefficients of variation and mean signs alone.
///
/// `v_shared` stands in for `V(1/z²)` and is taken as `cv_z²`, the
/// first-order delta-method approximation.
pub fn induced_ratio_correlation(
    cv_x: f64,
    cv_y: f64,
    cv_z: f64,
    mean_sign_x: f64,
    mean_sign_y: f64,
) -> f64 {
    let v_shared = cv_z * cv_z;
    let denominator = ((cv_x * cv_x * (1.0 + v_shared) + v_shared)
        * (cv_y * cv_y * (1.0 + v_shared) + v_shared))
        .sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    ((v_shared * mean_sign_x.signum() * mean_sign_y.signum()) / denominator).clamp(-1.0, 1.0)
}

/// Rolling-window coefficient of variation with window `max(3, n/3)`.
///
/// Windows with a near-zero mean are skipped rather than emitted as
/// blow-ups, so a sequence can be shorter than `n - window + 1`.
pub fn rolling_cv(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let window = (n / 3).max(3);
    if n < window {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n - window + 1);
    for start in 0..=(n - window) {
        if let Ok(cv) = coefficient_of_variation(&values[start..start + window]) {
            out.push(cv);
        }
    }
    out
}

/// Relative dispersion of a rolling-CV sequence; high values mean the
/// series' dispersion regime is itself shifting over time.
fn rolling_cv_dispersion(sequence: &[f64]) -> f64 {
    if sequence.len() < 2 {
        return 0.0;
    }
    let m = mean(sequence);
    if m.abs() < 1e-12 {
        return 0.0;
    }
    standard_deviation(sequence) / m.abs()
}

/// Full common-denominator analysis of `x` and `y` against a candidate
/// shared denominator `z`.
///
/// # Errors
/// * [`StatError::InsufficientData`] below 3 points (CV is unstable there)
/// * [`StatError::NumericalError`] when any series mean is too close to
///   zero to support a CV
pub fn spurious_ratio_analysis(
    x: &[f64],
    y: &[f64],
    z: &[f64],
) -> StatResult<SpuriousCorrelationReport> {
    validate_data_length(x, 3, "spurious_ratio_analysis")?;
    validate_data_length(y, 3, "spurious_ratio_analysis")?;
    validate_data_length(z, 3, "spurious_ratio_analysis")?;

    let cv_x = coefficient_of_variation(x)?;
    let cv_y = coefficient_of_variation(y)?;
    let cv_z = coefficient_of_variation(z)?;

    let induced = induced_ratio_correlation(cv_x, cv_y, cv_z, mean(x), mean(y));

    let rolling_cv_x = rolling_cv(x);
    let rolling_cv_y = rolling_cv(y);
    let cv_unstable = rolling_cv_dispersion(&rolling_cv_x) > ROLLING_CV_INSTABILITY
        || rolling_cv_dispersion(&rolling_cv_y) > ROLLING_CV_INSTABILITY;

    let mut risk = SpuriousRiskLevel::from_magnitude(induced.abs());
    if cv_unstable {
        risk = risk.escalated();
    }

    Ok(SpuriousCorrelationReport {
        induced_correlation: induced,
        cv_x,
        cv_y,
        cv_z,
        risk,
        rolling_cv_x,
        rolling_cv_y,
        cv_unstable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StatError;
    use crate::rng::AnalysisRng;

    #[test]
    fn test_formula_bounds_randomized() {
        // Property: the induced correlation stays in [-1, 1] for any
        // positive CVs and any mean signs
        let mut rng = AnalysisRng::with_seed(1897);
        for _ in 0..2000 {
            let cv_x = rng.f64() * 5.0;
            let cv_y = rng.f64() * 5.0;
            let cv_z = rng.f64() * 5.0;
            let sx = if rng.f64() < 0.5 { -1.0 } else { 1.0 };
            let sy = if rng.f64() < 0.5 { -1.0 } else { 1.0 };
            let r = induced_ratio_correlation(cv_x, cv_y, cv_z, sx, sy);
            assert!(r.abs() <= 1.0, "induced correlation {} out of bounds", r);
        }
    }

    #[test]
    fn test_stable_denominator_low_risk() {
        // Nearly constant z induces almost nothing
        let r = induced_ratio_correlation(0.3, 0.4, 0.01, 1.0, 1.0);
        assert!(r.abs() < 0.01);
        assert_eq!(SpuriousRiskLevel::from_magnitude(r.abs()), SpuriousRiskLevel::Low);
    }

    #[test]
    fn test_volatile_denominator_dominates() {
        // z varies much more than the numerators: induced r approaches 1
        let r = induced_ratio_correlation(0.05, 0.05, 1.5, 1.0, 1.0);
        assert!(r > 0.9, "expected near-unity induced correlation, got {}", r);
    }

    #[test]
    fn test_sign_flip() {
        let positive = induced_ratio_correlation(0.2, 0.2, 0.8, 1.0, 1.0);
        let negative = induced_ratio_correlation(0.2, 0.2, 0.8, -1.0, 1.0);
        assert!(positive > 0.0);
        assert!((positive + negative).abs() < 1e-12);
    }

    #[test]
    fn test_common_denominator_scenario() {
        // x/z and y/z are both constant-ish ratios dominated by z's
        // variation, so the formula must report a large induced correlation
        let x = vec![10.0, 20.0, 30.0];
        let y = vec![100.0, 200.0, 300.0];
        let z = vec![1.0, 2.0, 3.0];
        let report = spurious_ratio_analysis(&x, &y, &z).unwrap();
        assert!(
            report.induced_correlation.abs() > RISK_HIGH_THRESHOLD,
            "induced correlation {} should be high",
            report.induced_correlation
        );
        assert!(report.risk >= SpuriousRiskLevel::High);
    }

    #[test]
    fn test_rolling_cv_window() {
        let values: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        // window = max(3, 12/3) = 4, so 9 windows
        let rolling = rolling_cv(&values);
        assert_eq!(rolling.len(), 9);
        assert!(rolling.iter().all(|cv| cv.is_finite() && *cv > 0.0));
    }

    #[test]
    fn test_instability_escalates_risk() {
        // Quiet first regime, wild second regime: rolling CV jumps
        let x = vec![100.0, 101.0, 100.5, 100.8, 100.2, 300.0, 50.0, 420.0, 80.0, 350.0];
        let y = vec![10.0, 20.0, 15.0, 18.0, 12.0, 25.0, 14.0, 22.0, 16.0, 19.0];
        let z = vec![1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.2, 2.4, 2.6, 2.8];
        let report = spurious_ratio_analysis(&x, &y, &z).unwrap();
        assert!(report.cv_unstable);
    }

    #[test]
    fn test_zero_mean_series_rejected() {
        let centered = vec![-1.0, 0.0, 1.0];
        let y = vec![1.0, 2.0, 3.0];
        let z = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            spurious_ratio_analysis(&centered, &y, &z),
            Err(StatError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            spurious_ratio_analysis(&[1.0, 2.0], &[1.0, 2.0], &[1.0, 2.0]),
            Err(StatError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_risk_labels_exposed_as_data() {
        assert_eq!(SpuriousRiskLevel::from_magnitude(0.2), SpuriousRiskLevel::Low);
        assert_eq!(SpuriousRiskLevel::from_magnitude(0.4), SpuriousRiskLevel::Medium);
        assert_eq!(SpuriousRiskLevel::from_magnitude(0.6), SpuriousRiskLevel::High);
        assert_eq!(SpuriousRiskLevel::from_magnitude(0.9), SpuriousRiskLevel::Critical);
        assert!(!SpuriousRiskLevel::Critical.interpretation().is_empty());
        assert!(!SpuriousRiskLevel::Low.recommendation().is_empty());
        assert_eq!(SpuriousRiskLevel::Critical.escalated(), SpuriousRiskLevel::Critical);
    }
}
