//! Analysis configuration and tunable assessment thresholds.
//!
//! Every threshold the aggregator keys off lives in
//! [`AssessmentThresholds`] rather than inline literals, so tests and
//! callers can tune them. Resampling counts are capped to bound worst-case
//! latency when the engine sits behind a service endpoint.

use crate::errors::{StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default permutation count for the significance test.
pub const DEFAULT_PERMUTATIONS: usize = 10_000;
/// Minimum permutations for a usable null distribution.
pub const MIN_PERMUTATIONS: usize = 100;
/// Hard cap on permutations.
pub const MAX_PERMUTATIONS: usize = 100_000;

/// Default bootstrap resample count.
pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1_000;
/// Minimum bootstrap resamples for a stable percentile interval.
pub const MIN_BOOTSTRAP_SAMPLES: usize = 100;
/// Hard cap on bootstrap resamples.
pub const MAX_BOOTSTRAP_SAMPLES: usize = 10_000;

/// Confidence level bounds.
pub const MIN_CONFIDENCE_LEVEL: f64 = 0.5;
/// Upper confidence level bound.
pub const MAX_CONFIDENCE_LEVEL: f64 = 0.999;

/// Number of correlation methods tested, used for the Bonferroni-style
/// p-value correction (Pearson, Spearman, Kendall).
pub const CORRELATION_METHODS_TESTED: usize = 3;

/// Options controlling a single engine invocation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisOptions {
    /// Number of permutations for the significance test
    pub permutations: usize,
    /// Number of bootstrap resamples for the confidence interval
    pub bootstrap_samples: usize,
    /// Confidence level for intervals (e.g. 0.95)
    pub confidence_level: f64,
    /// Random seed for reproducible resampling; OS entropy when `None`
    pub seed: Option<u64>,
    /// Per-tail trim proportion for the winsorized correlation
    pub winsor_trim: f64,
    /// Thresholds used by the overall assessment aggregator
    pub thresholds: AssessmentThresholds,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            permutations: DEFAULT_PERMUTATIONS,
            bootstrap_samples: DEFAULT_BOOTSTRAP_SAMPLES,
            confidence_level: 0.95,
            seed: None,
            winsor_trim: 0.05,
            thresholds: AssessmentThresholds::default(),
        }
    }
}

impl AnalysisOptions {
    /// Options with a fixed seed, for reproducible reports.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Named thresholds for the overall assessment aggregator.
///
/// All values are heuristic tuning constants, not derived quantities.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssessmentThresholds {
    /// Reliability score cutoffs mapping to the five labels
    /// (Very Low / Low / Moderate / High / Very High)
    pub reliability_cutoffs: [f64; 4],
    /// |Pearson - Spearman| divergence that flags possible nonlinearity
    pub nonlinearity_divergence: f64,
    /// Significance level used for corrected p-value checks
    pub alpha: f64,
    /// Leave-one-out correlation change treated as high outlier influence
    pub outlier_influence: f64,
    /// Normality proxy statistic below which data is treated as non-normal
    pub normality_proxy_min: f64,
    /// |lag-1 autocorrelation| above which a series is flagged
    pub autocorrelation_flag: f64,
    /// |trend correlation| above which a series is flagged non-stationary
    pub stationarity_flag: f64,
    /// |first-half minus second-half correlation| flagging a structural break
    pub structural_break_flag: f64,
    /// |squared-residuals-vs-x correlation| above which heteroscedasticity
    /// is flagged
    pub heteroscedasticity_flag: f64,
    /// Point contributions to the spurious-probability estimate
    pub spurious_weights: SpuriousProbabilityWeights,
}

impl Default for AssessmentThresholds {
    fn default() -> Self {
        Self {
            reliability_cutoffs: [0.2, 0.4, 0.6, 0.8],
            nonlinearity_divergence: 0.2,
            alpha: 0.05,
            outlier_influence: 0.1,
            normality_proxy_min: 0.9,
            autocorrelation_flag: 0.5,
            stationarity_flag: 0.7,
            structural_break_flag: 0.3,
            heteroscedasticity_flag: 0.5,
            spurious_weights: SpuriousProbabilityWeights::default(),
        }
    }
}

/// Additive point contributions to the 0-100 spurious-probability estimate.
///
/// Like the thresholds above these are heuristic tuning constants, exposed
/// so callers can re-weight the aggregation without forking the engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpuriousProbabilityWeights {
    /// Points for a Medium induced-correlation risk band
    pub medium_risk: f64,
    /// Points for a High risk band
    pub high_risk: f64,
    /// Points for a Critical risk band
    pub critical_risk: f64,
    /// Multiplier on the |induced correlation| magnitude
    pub induced_magnitude_scale: f64,
    /// Points when both series trend with the time index
    pub shared_trend: f64,
    /// Points for a flagged structural break
    pub structural_break: f64,
    /// Points when the corrected p-value misses significance
    pub non_significant: f64,
}

impl Default for SpuriousProbabilityWeights {
    fn default() -> Self {
        Self {
            medium_risk: 25.0,
            high_risk: 40.0,
            critical_risk: 55.0,
            induced_magnitude_scale: 30.0,
            shared_trend: 15.0,
            structural_break: 10.0,
            non_significant: 15.0,
        }
    }
}

/// Validate options before running any analysis.
pub fn validate_options(options: &AnalysisOptions) -> StatResult<()> {
    if options.permutations < MIN_PERMUTATIONS || options.permutations > MAX_PERMUTATIONS {
        return Err(StatError::InvalidParameter {
            parameter: "permutations".to_string(),
            value: options.permutations as f64,
            constraint: format!("Must be in [{}, {}]", MIN_PERMUTATIONS, MAX_PERMUTATIONS),
        });
    }
    if options.bootstrap_samples < MIN_BOOTSTRAP_SAMPLES
        || options.bootstrap_samples > MAX_BOOTSTRAP_SAMPLES
    {
        return Err(StatError::InvalidParameter {
            parameter: "bootstrap_samples".to_string(),
            value: options.bootstrap_samples as f64,
            constraint: format!(
                "Must be in [{}, {}]",
                MIN_BOOTSTRAP_SAMPLES, MAX_BOOTSTRAP_SAMPLES
            ),
        });
    }
    if options.confidence_level < MIN_CONFIDENCE_LEVEL
        || options.confidence_level > MAX_CONFIDENCE_LEVEL
    {
        return Err(StatError::InvalidParameter {
            parameter: "confidence_level".to_string(),
            value: options.confidence_level,
            constraint: format!(
                "Must be in [{}, {}]",
                MIN_CONFIDENCE_LEVEL, MAX_CONFIDENCE_LEVEL
            ),
        });
    }
    if !(0.0..0.5).contains(&options.winsor_trim) {
        return Err(StatError::InvalidParameter {
            parameter: "winsor_trim".to_string(),
            value: options.winsor_trim,
            constraint: "Must be in [0, 0.5)".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_valid() {
        assert!(validate_options(&AnalysisOptions::default()).is_ok());
        assert!(validate_options(&AnalysisOptions::seeded(42)).is_ok());
    }

    #[test]
    fn test_assessment_threshold_defaults() {
        let thresholds = AssessmentThresholds::default();
        assert_eq!(thresholds.heteroscedasticity_flag, 0.5);
        assert_eq!(thresholds.spurious_weights.medium_risk, 25.0);
        assert_eq!(thresholds.spurious_weights.high_risk, 40.0);
        assert_eq!(thresholds.spurious_weights.critical_risk, 55.0);
        assert_eq!(thresholds.spurious_weights.induced_magnitude_scale, 30.0);
        assert_eq!(thresholds.spurious_weights.non_significant, 15.0);
    }

    #[test]
    fn test_permutation_cap() {
        let mut options = AnalysisOptions::default();
        options.permutations = MAX_PERMUTATIONS + 1;
        assert!(matches!(
            validate_options(&options),
            Err(StatError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_bootstrap_floor() {
        let mut options = AnalysisOptions::default();
        options.bootstrap_samples = 10;
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn test_confidence_level_bounds() {
        let mut options = AnalysisOptions::default();
        options.confidence_level = 0.3;
        assert!(validate_options(&options).is_err());
        options.confidence_level = 1.0;
        assert!(validate_options(&options).is_err());
    }

    #[test]
    fn test_winsor_trim_bounds() {
        let mut options = AnalysisOptions::default();
        options.winsor_trim = 0.5;
        assert!(validate_options(&options).is_err());
    }
}
