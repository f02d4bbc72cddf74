//! # Correlation Engine
//!
//! Multi-method correlation analysis and diagnostics for short aligned time
//! series, sized for yearly economic and demographic data.
//!
//! Given two series of `(index, value)` observations the engine aligns them
//! on their common indices, computes Pearson, Spearman and Kendall
//! correlations, and then runs an independent battery of validity checks:
//! permutation significance with bootstrap confidence intervals, Box-Cox
//! transformation analysis, Pearson's common-denominator spurious-correlation
//! screen, robust and outlier-resistant estimates, non-parametric tests, and
//! regression-assumption diagnostics. Everything is folded into a single
//! [`StatisticalReport`] with an overall reliability assessment.
//!
//! ## Key Features
//!
//! - **Multiple Methods**: Pearson, Spearman, and Kendall over the same aligned pair
//! - **Resampling Inference**: Fisher-Yates permutation test and pair bootstrap, seedable for reproducibility
//! - **Spuriousness Screening**: Pearson (1897) induced ratio correlation and rolling-CV stability
//! - **Robustness**: Winsorized and MAD-scaled estimates, leave-one-out influence, leverage points
//! - **Diagnostics**: Heteroscedasticity, autocorrelation, trend, structural break, VIF
//! - **Partial Reports**: Sections that cannot be computed are reported with a reason, never silently zeroed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use correlation_engine::{compute_statistical_report, AnalysisOptions, TimePoint};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gdp: Vec<TimePoint> = (0..12)
//!         .map(|i| TimePoint::new(2010 + i, 100.0 + 3.5 * i as f64))
//!         .collect();
//!     let consumption: Vec<TimePoint> = (0..12)
//!         .map(|i| TimePoint::new(2010 + i, 60.0 + 2.1 * i as f64))
//!         .collect();
//!
//!     let report = compute_statistical_report(&gdp, &consumption, &AnalysisOptions::seeded(42))?;
//!     println!(
//!         "r = {:.3}, reliability {:?}, spurious probability {:.0}%",
//!         report.core.pearson.coefficient,
//!         report.assessment.reliability,
//!         report.assessment.spurious_probability,
//!     );
//!     for warning in &report.assessment.warnings {
//!         println!("warning: {}", warning);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around [`compute_statistical_report`] (and the
//! [`CorrelationAnalyzer`] wrapper), which orchestrates alignment and all
//! analysis sections. Individual analyses can also be called directly on
//! plain `&[f64]` pairs for specialized applications.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod assessment;
pub mod config;
pub mod correlation;
pub mod descriptive;
pub mod engine;
pub mod errors;
pub mod report;
pub mod rng;
pub mod series;

// Analysis sections
pub mod boxcox;
pub mod diagnostics;
pub mod nonparametric;
pub mod robust;
pub mod significance;
pub mod spurious;

// Re-exports for convenience - main public API
pub use config::{AnalysisOptions, AssessmentThresholds, SpuriousProbabilityWeights};
pub use engine::{compute_statistical_report, CorrelationAnalyzer};
pub use errors::{StatError, StatResult};
pub use report::{CoreCorrelations, SectionOutcome, StatisticalReport};
pub use series::{align, AlignedSeries, TimePoint, MIN_ALIGNED_POINTS};

// Correlation exports
pub use correlation::{kendall_tau, pearson, spearman, CorrelationEstimate};

// Inference exports
pub use significance::{permutation_significance, EffectSizeClass, SignificanceReport};

// Transformation and screening exports
pub use boxcox::{box_cox_analysis, box_cox_transform, BoxCoxReport};
pub use spurious::{
    induced_ratio_correlation, rolling_cv, spurious_ratio_analysis, SpuriousCorrelationReport,
    SpuriousRiskLevel,
};

// Robust and non-parametric exports
pub use nonparametric::{
    jarque_bera, kolmogorov_smirnov, mann_whitney_u, nonparametric_tests, shapiro_wilk_proxy,
    NonParametricReport, TestStatistic,
};
pub use robust::{robust_correlations, RobustCorrelationReport};

// Diagnostics and assessment exports
pub use assessment::{OverallAssessment, RecommendedMethod, ReliabilityLabel};
pub use diagnostics::{run_diagnostics, DiagnosticsReport};
