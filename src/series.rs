//! Time series types and alignment.
//!
//! Callers supply two series of `(index, value)` observations, typically one
//! per year. The engine only ever computes over the inner join of the two
//! index sets, produced by [`align`].

use crate::errors::{validate_all_finite, StatError, StatResult};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum number of overlapping observations required for any analysis.
pub const MIN_ALIGNED_POINTS: usize = 3;

/// One observation of one variable at an orderable time index.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimePoint {
    /// Time index, e.g. a year
    pub index: i64,
    /// Observed value
    pub value: f64,
}

impl TimePoint {
    /// Convenience constructor.
    pub fn new(index: i64, value: f64) -> Self {
        Self { index, value }
    }
}

/// Two series restricted to their common time indices, ascending by index.
///
/// Invariant: `indices`, `x` and `y` have identical length ≥
/// [`MIN_ALIGNED_POINTS`], and `indices` is strictly increasing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlignedSeries {
    /// Common time indices, strictly ascending
    pub indices: Vec<i64>,
    /// First series values at the common indices
    pub x: Vec<f64>,
    /// Second series values at the common indices
    pub y: Vec<f64>,
}

impl AlignedSeries {
    /// Number of aligned observations.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the aligned series is empty (never true for values produced
    /// by [`align`]).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Inner-join two series on their time indices.
///
/// Only indices present in *both* inputs survive; output is strictly
/// ascending by index. If an input series contains duplicate indices, the
/// last value for that index wins.
///
/// # Errors
/// * [`StatError::NumericalError`] if any value is non-finite
/// * [`StatError::InsufficientData`] if fewer than [`MIN_ALIGNED_POINTS`]
///   indices overlap
pub fn align(series1: &[TimePoint], series2: &[TimePoint]) -> StatResult<AlignedSeries> {
    let values1: Vec<f64> = series1.iter().map(|p| p.value).collect();
    let values2: Vec<f64> = series2.iter().map(|p| p.value).collect();
    validate_all_finite(&values1, "align(series1)")?;
    validate_all_finite(&values2, "align(series2)")?;

    // BTreeMap deduplicates (last write wins) and yields ascending order.
    let map1: BTreeMap<i64, f64> = series1.iter().map(|p| (p.index, p.value)).collect();
    let map2: BTreeMap<i64, f64> = series2.iter().map(|p| (p.index, p.value)).collect();

    let mut indices = Vec::new();
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (&index, &v1) in &map1 {
        if let Some(&v2) = map2.get(&index) {
            indices.push(index);
            x.push(v1);
            y.push(v2);
        }
    }

    if indices.len() < MIN_ALIGNED_POINTS {
        return Err(StatError::InsufficientData {
            required: MIN_ALIGNED_POINTS,
            actual: indices.len(),
        });
    }

    Ok(AlignedSeries { indices, x, y })
}
