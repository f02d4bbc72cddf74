//! Overall assessment aggregation.
//!
//! Single-pass weighted scoring over the independent section results.
//! Unavailable sections are skipped and the remaining component weights
//! renormalized, so a partial report still yields an assessment — just a
//! less informed one, which the warnings call out.
//!
//! Every cutoff and point weight used here comes from
//! [`AssessmentThresholds`](crate::config::AssessmentThresholds) (including
//! its nested [`SpuriousProbabilityWeights`](crate::config::SpuriousProbabilityWeights)).
//! The remaining fixed numbers are the reliability component weights below
//! and the partial-credit factors inside the score, which shape how the
//! configured cutoffs combine rather than where they sit.

use crate::boxcox::BoxCoxReport;
use crate::config::AssessmentThresholds;
use crate::diagnostics::DiagnosticsReport;
use crate::nonparametric::NonParametricReport;
use crate::report::CoreCorrelations;
use crate::robust::RobustCorrelationReport;
use crate::significance::SignificanceReport;
use crate::spurious::{SpuriousCorrelationReport, SpuriousRiskLevel};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Reliability component weights, renormalized over the available sections
const WEIGHT_SIGNIFICANCE: f64 = 0.30;
const WEIGHT_METHOD_AGREEMENT: f64 = 0.20;
const WEIGHT_NORMALITY: f64 = 0.15;
const WEIGHT_DIAGNOSTICS: f64 = 0.35;

/// Five-level reliability label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReliabilityLabel {
    /// score < cutoff 0
    VeryLow,
    /// cutoff 0 <= score < cutoff 1
    Low,
    /// cutoff 1 <= score < cutoff 2
    Moderate,
    /// cutoff 2 <= score < cutoff 3
    High,
    /// score >= cutoff 3
    VeryHigh,
}

impl ReliabilityLabel {
    /// Map a 0-1 score through the configured cutoffs.
    pub fn from_score(score: f64, cutoffs: &[f64; 4]) -> Self {
        if score < cutoffs[0] {
            ReliabilityLabel::VeryLow
        } else if score < cutoffs[1] {
            ReliabilityLabel::Low
        } else if score < cutoffs[2] {
            ReliabilityLabel::Moderate
        } else if score < cutoffs[3] {
            ReliabilityLabel::High
        } else {
            ReliabilityLabel::VeryHigh
        }
    }
}

/// Which correlation estimate the caller should trust most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecommendedMethod {
    /// Plain Pearson correlation
    Pearson,
    /// Spearman rank correlation (non-normal data)
    Spearman,
    /// Kendall's tau (non-normal data, stronger than Spearman here)
    Kendall,
    /// Winsorized correlation (outlier influence)
    Winsorized,
    /// Pearson over Box-Cox transformed series
    BoxCoxTransformed,
}

/// Aggregated reliability and spuriousness assessment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OverallAssessment {
    /// Weighted reliability score in [0, 1]
    pub reliability_score: f64,
    /// Label mapped through the configured cutoffs
    pub reliability: ReliabilityLabel,
    /// Additive spuriousness estimate in [0, 100]
    pub spurious_probability: f64,
    /// Method recommendation from the rule cascade
    pub recommended_method: RecommendedMethod,
    /// Coefficient of the recommended method
    pub recommended_correlation: f64,
    /// Human-readable warnings keyed off the same thresholds
    pub warnings: Vec<String>,
}

/// Aggregate the section results into one assessment.
#[allow(clippy::too_many_arguments)]
pub fn assess(
    core: &CoreCorrelations,
    significance: Option<&SignificanceReport>,
    box_cox: Option<&BoxCoxReport>,
    spurious: Option<&SpuriousCorrelationReport>,
    robust: Option<&RobustCorrelationReport>,
    nonparametric: Option<&NonParametricReport>,
    diagnostics: Option<&DiagnosticsReport>,
    thresholds: &AssessmentThresholds,
) -> OverallAssessment {
    let mut warnings = Vec::new();

    if core.pearson.degenerate || core.spearman.degenerate {
        warnings.push(
            "At least one series has zero variance; correlation is unmeasurable, not zero"
                .to_string(),
        );
    }

    let divergence = (core.pearson.coefficient - core.spearman.coefficient).abs();
    let methods_agree = divergence < thresholds.nonlinearity_divergence;
    if !methods_agree {
        warnings.push(format!(
            "Pearson and Spearman diverge by {:.2}; the relationship may be nonlinear",
            divergence
        ));
    }

    let non_normal = is_non_normal(nonparametric, thresholds);
    if non_normal {
        warnings.push("Normality checks failed; rank-based methods preferred".to_string());
    }

    // Reliability: weighted components, renormalized over what's available
    let mut score_sum = 0.0;
    let mut weight_sum = 0.0;

    // Method agreement is always computable
    let agreement_score = if methods_agree {
        1.0
    } else if divergence < 2.0 * thresholds.nonlinearity_divergence {
        0.5
    } else {
        0.0
    };
    score_sum += WEIGHT_METHOD_AGREEMENT * agreement_score;
    weight_sum += WEIGHT_METHOD_AGREEMENT;

    if let Some(sig) = significance {
        let significant = sig.corrected_p_value < thresholds.alpha;
        let component = if significant {
            1.0
        } else {
            // Partial credit tracks power so small samples are not punished
            // as if they were contradicting evidence
            0.3 * sig.statistical_power
        };
        score_sum += WEIGHT_SIGNIFICANCE * component;
        weight_sum += WEIGHT_SIGNIFICANCE;
        if !significant {
            warnings.push(format!(
                "Correlation not significant after correction (p = {:.3})",
                sig.corrected_p_value
            ));
        }
    }

    if nonparametric.is_some() {
        score_sum += WEIGHT_NORMALITY * if non_normal { 0.0 } else { 1.0 };
        weight_sum += WEIGHT_NORMALITY;
    }

    if let Some(diag) = diagnostics {
        let mut ok = 0.0;
        let mut total = 0.0;

        total += 1.0;
        if diag.heteroscedasticity.abs() < thresholds.heteroscedasticity_flag {
            ok += 1.0;
        } else {
            warnings.push("Residual variance is not constant (heteroscedasticity)".to_string());
        }

        total += 1.0;
        let autocorrelated = diag.autocorrelation_x.abs() > thresholds.autocorrelation_flag
            || diag.autocorrelation_y.abs() > thresholds.autocorrelation_flag;
        if !autocorrelated {
            ok += 1.0;
        } else {
            warnings.push(
                "Strong lag-1 autocorrelation; effective sample size is smaller than it looks"
                    .to_string(),
            );
        }

        total += 1.0;
        let trending = diag.trend_x.abs() > thresholds.stationarity_flag
            || diag.trend_y.abs() > thresholds.stationarity_flag;
        if !trending {
            ok += 1.0;
        } else {
            warnings.push(
                "Trending series detected; correlation may reflect shared drift".to_string(),
            );
        }

        if let Some(break_size) = diag.structural_break {
            total += 1.0;
            if break_size <= thresholds.structural_break_flag {
                ok += 1.0;
            } else {
                warnings.push(format!(
                    "Relationship shifts between halves (break size {:.2})",
                    break_size
                ));
            }
        }

        score_sum += WEIGHT_DIAGNOSTICS * (ok / total);
        weight_sum += WEIGHT_DIAGNOSTICS;
    }

    let reliability_score = if weight_sum > 0.0 {
        (score_sum / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let reliability = ReliabilityLabel::from_score(reliability_score, &thresholds.reliability_cutoffs);

    let spurious_probability =
        spurious_probability(significance, spurious, diagnostics, thresholds, &mut warnings);

    let (recommended_method, recommended_correlation) = recommend_method(
        core,
        box_cox,
        robust,
        non_normal,
        thresholds,
        &mut warnings,
    );

    OverallAssessment {
        reliability_score,
        reliability,
        spurious_probability,
        recommended_method,
        recommended_correlation,
        warnings,
    }
}

fn is_non_normal(
    nonparametric: Option<&NonParametricReport>,
    thresholds: &AssessmentThresholds,
) -> bool {
    match nonparametric {
        Some(np) => {
            // Jarque-Bera is the trusted check; the proxy only corroborates
            let jb_reject = np.jarque_bera_x.p_value < thresholds.alpha
                || np.jarque_bera_y.p_value < thresholds.alpha;
            let proxy_reject = np.shapiro_proxy_x < thresholds.normality_proxy_min
                && np.shapiro_proxy_y < thresholds.normality_proxy_min;
            jb_reject || proxy_reject
        }
        None => false,
    }
}

fn spurious_probability(
    significance: Option<&SignificanceReport>,
    spurious: Option<&SpuriousCorrelationReport>,
    diagnostics: Option<&DiagnosticsReport>,
    thresholds: &AssessmentThresholds,
    warnings: &mut Vec<String>,
) -> f64 {
    let weights = &thresholds.spurious_weights;
    let mut probability = 0.0;

    if let Some(sp) = spurious {
        probability += match sp.risk {
            SpuriousRiskLevel::Low => 0.0,
            SpuriousRiskLevel::Medium => weights.medium_risk,
            SpuriousRiskLevel::High => weights.high_risk,
            SpuriousRiskLevel::Critical => weights.critical_risk,
        };
        probability += sp.induced_correlation.abs() * weights.induced_magnitude_scale;
        if sp.risk >= SpuriousRiskLevel::High {
            warnings.push(format!(
                "Common-denominator risk is {:?}: {}",
                sp.risk,
                sp.risk.interpretation()
            ));
        }
    }

    if let Some(diag) = diagnostics {
        if diag.trend_x.abs() > thresholds.stationarity_flag
            && diag.trend_y.abs() > thresholds.stationarity_flag
        {
            probability += weights.shared_trend;
        }
        if let Some(break_size) = diag.structural_break {
            if break_size > thresholds.structural_break_flag {
                probability += weights.structural_break;
            }
        }
    }

    if let Some(sig) = significance {
        if sig.corrected_p_value >= thresholds.alpha {
            probability += weights.non_significant;
        }
    }

    probability.min(100.0)
}

fn recommend_method(
    core: &CoreCorrelations,
    box_cox: Option<&BoxCoxReport>,
    robust: Option<&RobustCorrelationReport>,
    non_normal: bool,
    thresholds: &AssessmentThresholds,
    warnings: &mut Vec<String>,
) -> (RecommendedMethod, f64) {
    if non_normal {
        return if core.kendall.coefficient.abs() > core.spearman.coefficient.abs() {
            (RecommendedMethod::Kendall, core.kendall.coefficient)
        } else {
            (RecommendedMethod::Spearman, core.spearman.coefficient)
        };
    }

    if let Some(rb) = robust {
        if rb.outlier_influence > thresholds.outlier_influence {
            warnings.push(format!(
                "A single point shifts the correlation by {:.2}; winsorized estimate preferred",
                rb.outlier_influence
            ));
            return (RecommendedMethod::Winsorized, rb.winsorized);
        }
    }

    if let Some(bc) = box_cox {
        if bc.transformation_needed {
            warnings.push(
                "Box-Cox analysis recommends transforming before interpreting Pearson".to_string(),
            );
            return (
                RecommendedMethod::BoxCoxTransformed,
                bc.transformed_correlation,
            );
        }
    }

    (RecommendedMethod::Pearson, core.pearson.coefficient)
}
