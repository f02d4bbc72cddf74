//! The aggregate report returned by the engine.
//!
//! Sections are computed independently; a failure in one is recorded as
//! [`SectionOutcome::Unavailable`] with its reason instead of failing the
//! whole report. Callers must check availability before rendering a
//! section — an unavailable section has no numbers to show.

use crate::assessment::OverallAssessment;
use crate::boxcox::BoxCoxReport;
use crate::correlation::CorrelationEstimate;
use crate::diagnostics::DiagnosticsReport;
use crate::errors::StatError;
use crate::nonparametric::NonParametricReport;
use crate::robust::RobustCorrelationReport;
use crate::significance::SignificanceReport;
use crate::spurious::SpuriousCorrelationReport;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A report section that either computed successfully or was skipped with
/// an explicit reason.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SectionOutcome<T> {
    /// The section computed successfully
    Available(T),
    /// The section was skipped; `reason` explains why
    Unavailable {
        /// Human-readable reason the section could not be computed
        reason: String,
    },
}

impl<T> SectionOutcome<T> {
    /// Build from a sub-analysis result, logging skipped sections.
    pub fn from_result(section: &str, result: Result<T, StatError>) -> Self {
        match result {
            Ok(value) => SectionOutcome::Available(value),
            Err(e) => {
                log::warn!("Section '{}' unavailable: {}", section, e);
                SectionOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Reference to the value when available.
    pub fn available(&self) -> Option<&T> {
        match self {
            SectionOutcome::Available(value) => Some(value),
            SectionOutcome::Unavailable { .. } => None,
        }
    }

    /// Whether the section computed successfully.
    pub fn is_available(&self) -> bool {
        matches!(self, SectionOutcome::Available(_))
    }
}

/// The three core correlation estimates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoreCorrelations {
    /// Pearson product-moment correlation
    pub pearson: CorrelationEstimate,
    /// Spearman rank correlation
    pub spearman: CorrelationEstimate,
    /// Kendall's tau
    pub kendall: CorrelationEstimate,
}

/// Full multi-method statistical report for one pair of series.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatisticalReport {
    /// Number of aligned observations the analyses ran over
    pub aligned_points: usize,
    /// First and last common time index
    pub index_range: (i64, i64),
    /// Core correlation estimates (always present once alignment succeeds)
    pub core: CoreCorrelations,
    /// Permutation significance and bootstrap results
    pub significance: SectionOutcome<SignificanceReport>,
    /// Box-Cox transformation analysis
    pub box_cox: SectionOutcome<BoxCoxReport>,
    /// Common-denominator spurious-correlation analysis
    pub spurious: SectionOutcome<SpuriousCorrelationReport>,
    /// Robust correlation variants and influence measures
    pub robust: SectionOutcome<RobustCorrelationReport>,
    /// Non-parametric tests and normality checks
    pub nonparametric: SectionOutcome<NonParametricReport>,
    /// Regression-assumption diagnostics
    pub diagnostics: SectionOutcome<DiagnosticsReport>,
    /// Aggregated reliability and spuriousness assessment
    pub assessment: OverallAssessment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_outcome_from_ok() {
        let outcome = SectionOutcome::from_result("test", Ok(5_usize));
        assert!(outcome.is_available());
        assert_eq!(outcome.available(), Some(&5));
    }

    #[test]
    fn test_section_outcome_from_err() {
        let outcome: SectionOutcome<usize> = SectionOutcome::from_result(
            "test",
            Err(StatError::InsufficientData {
                required: 6,
                actual: 4,
            }),
        );
        assert!(!outcome.is_available());
        match outcome {
            SectionOutcome::Unavailable { reason } => {
                assert!(reason.contains("at least 6"));
            }
            _ => panic!("expected unavailable"),
        }
    }
}
