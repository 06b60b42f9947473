//! # Scalar Series
//!
//! Dense, uniformly indexed `f64` series built by resampling sparse samples.
//!
//! Index `i` of a series holds the value at domain position `i`, where the
//! domain is an implicit uniform axis (whole seconds since the workout start,
//! or whole meters traveled). A series never changes after construction: every
//! transform returns a new series.
//!
//! ## Resampling
//!
//! Given samples `(key[k], value[k])` with ascending keys, position `n` of the
//! output is
//!
//! - `value[0]` when `n <= key[0]`
//! - `value[last]` when `n > key[last]`
//! - otherwise the interpolation between the two samples whose keys bracket `n`
//!
//! The same routine drives [`CoordinateSeries`](crate::CoordinateSeries),
//! which interpolates along great circles instead of straight lines.

use std::ops::{Bound, Index, RangeBounds, RangeInclusive};

// ============================================================================
// Interpolation
// ============================================================================

/// A value that can be blended between two samples.
pub trait Interpolate: Copy {
    /// The value a fraction `t` of the way from `self` to `other`.
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// Resample `(keys, values)` onto the positions `0..domain_magnitude`.
///
/// Keys must be sorted ascending; this is only checked in debug builds.
///
/// # Panics
///
/// Panics if there are no samples or if `values` and `keys` differ in length.
pub(crate) fn resample<V: Interpolate>(values: &[V], keys: &[f64], domain_magnitude: usize) -> Vec<V> {
    assert_eq!(
        values.len(),
        keys.len(),
        "every sample needs exactly one key"
    );
    assert!(!values.is_empty(), "cannot resample an empty sample set");
    debug_assert!(
        keys.windows(2).all(|w| w[0] <= w[1]),
        "sample keys must be sorted ascending"
    );

    let first_key = keys[0];
    let last_key = keys[keys.len() - 1];
    let first_value = values[0];
    let last_value = values[values.len() - 1];

    let mut result = Vec::with_capacity(domain_magnitude);
    // smallest index with keys[upper] >= position; only moves forward
    let mut upper = 1;

    for n in 0..domain_magnitude {
        let position = n as f64;

        if position <= first_key {
            result.push(first_value);
            continue;
        }
        if position > last_key {
            result.push(last_value);
            continue;
        }

        while keys[upper] < position {
            upper += 1;
        }

        let lower = upper - 1;
        let span = keys[upper] - keys[lower];
        let t = (position - keys[lower]) / span;
        result.push(values[lower].interpolate(&values[upper], t));
    }

    result
}

/// Round a real domain magnitude away from zero into a length.
///
/// Negative or NaN magnitudes produce an empty domain.
#[inline]
pub(crate) fn domain_length(magnitude: f64) -> usize {
    let rounded = if magnitude >= 0.0 { magnitude.ceil() } else { magnitude.floor() };
    if rounded > 0.0 {
        rounded as usize
    } else {
        0
    }
}

/// Owned bounds of a range expression, for slicing.
#[inline]
pub(crate) fn bounds_of<R: RangeBounds<usize>>(range: &R) -> (Bound<usize>, Bound<usize>) {
    (range.start_bound().cloned(), range.end_bound().cloned())
}

/// Keys `0.5, 1.5, 2.5, ...` for the forward differences of a series.
fn midpoint_keys(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64 + 0.5).collect()
}

// ============================================================================
// ScalarSeries
// ============================================================================

/// A dense series of `f64` values over a uniform domain.
///
/// # Example
///
/// ```rust
/// use workout_series::ScalarSeries;
///
/// let series = ScalarSeries::interpolated(&[10.0, 20.0], &[0.0, 10.0], 11);
/// assert_eq!(series.len(), 11);
/// assert_eq!(series[0], 10.0);
/// assert_eq!(series[5], 15.0);
/// assert_eq!(series[10], 20.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSeries {
    data: Vec<f64>,
}

impl ScalarSeries {
    /// Resample `values` (observed at `keys`) onto `domain_magnitude` uniform positions.
    ///
    /// Keys must be sorted ascending. This is a caller contract: it is checked
    /// with a debug assertion only, and unsorted keys produce meaningless output
    /// in release builds.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty or if `values` and `keys` differ in length.
    pub fn interpolated(values: &[f64], keys: &[f64], domain_magnitude: usize) -> Self {
        Self { data: resample(values, keys, domain_magnitude) }
    }

    /// Like [`interpolated`](Self::interpolated) with a real domain magnitude,
    /// rounded away from zero.
    pub fn interpolated_over(values: &[f64], keys: &[f64], domain_magnitude: f64) -> Self {
        Self::interpolated(values, keys, domain_length(domain_magnitude))
    }

    /// Wrap an already-dense buffer.
    pub fn from_values(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// `count` values starting at `start`, each one greater than the last.
    pub fn ramp(start: f64, count: usize) -> Self {
        Self::from_values((0..count).map(|i| start + i as f64).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> Option<f64> {
        self.data.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.data.last().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// The values within `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[f64] {
        &self.data[bounds_of(&range)]
    }

    // ========================================================================
    // Reducers
    // ========================================================================

    /// Mean value over `range`, `None` if the range is empty.
    pub fn average<R: RangeBounds<usize>>(&self, range: R) -> Option<f64> {
        let values = self.slice(range);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Largest value over `range`, `None` if the range is empty.
    pub fn maximum<R: RangeBounds<usize>>(&self, range: R) -> Option<f64> {
        self.slice(range).iter().copied().reduce(f64::max)
    }

    /// Smallest value over `range`, `None` if the range is empty.
    pub fn minimum<R: RangeBounds<usize>>(&self, range: R) -> Option<f64> {
        self.slice(range).iter().copied().reduce(f64::min)
    }

    /// Change from the first to the last value in `range`; 0 for an empty range.
    pub fn delta<R: RangeBounds<usize>>(&self, range: R) -> f64 {
        match self.slice(range) {
            [] => 0.0,
            values => values[values.len() - 1] - values[0],
        }
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Rate of change per domain step.
    ///
    /// The forward differences sit between samples (at `0.5, 1.5, ...`) and
    /// are resampled back onto the domain of `self`.
    pub fn derivative(&self) -> Self {
        if self.len() < 2 {
            return Self::from_values(vec![0.0; self.len()]);
        }

        let deltas: Vec<f64> = self.data.windows(2).map(|w| w[1] - w[0]).collect();
        let keys = midpoint_keys(deltas.len());
        Self::interpolated(&deltas, &keys, self.len())
    }

    /// Rate of change with respect to another series over the same domain,
    /// e.g. speed as distance over time or grade as altitude over distance.
    ///
    /// Steps where `domain` does not change are dropped before resampling, so
    /// no infinities or NaNs reach the result. If `domain` never changes the
    /// result is all zeros.
    ///
    /// # Panics
    ///
    /// Panics if `domain` has a different length.
    pub fn derivative_in(&self, domain: &ScalarSeries) -> Self {
        assert_eq!(
            self.len(),
            domain.len(),
            "derivative domain must cover the same positions"
        );

        let mut values = Vec::with_capacity(self.len().saturating_sub(1));
        let mut keys = Vec::with_capacity(self.len().saturating_sub(1));

        for (i, (dy, dx)) in self
            .data
            .windows(2)
            .zip(domain.data.windows(2))
            .map(|(y, x)| (y[1] - y[0], x[1] - x[0]))
            .enumerate()
        {
            if dx != 0.0 {
                values.push(dy / dx);
                keys.push(i as f64 + 0.5);
            }
        }

        if values.is_empty() {
            return Self::from_values(vec![0.0; self.len()]);
        }
        Self::interpolated(&values, &keys, self.len())
    }

    /// The change from the previous value at every position; the first is 0.
    pub fn step_height(&self) -> Self {
        let mut steps = Vec::with_capacity(self.len());
        if !self.is_empty() {
            steps.push(0.0);
        }
        steps.extend(self.data.windows(2).map(|w| w[1] - w[0]));
        Self::from_values(steps)
    }

    /// Running sum; undoes [`step_height`](Self::step_height) up to the first value.
    pub fn stair_case(&self) -> Self {
        let mut total = 0.0;
        Self::from_values(
            self.data
                .iter()
                .map(|v| {
                    total += v;
                    total
                })
                .collect(),
        )
    }

    /// Every value clamped into `range`. Either bound may be infinite.
    pub fn clipping(&self, range: RangeInclusive<f64>) -> Self {
        let (lower, upper) = range.into_inner();
        Self::from_values(self.data.iter().map(|v| v.max(lower).min(upper)).collect())
    }

    /// Express this series over the domain described by `domain`.
    ///
    /// `domain` must cover the same positions as `self` and be non-decreasing
    /// (time or cumulative distance). Its values become the sample keys for
    /// `self`'s values; the new length is the last value of `domain`, rounded
    /// away from zero.
    ///
    /// # Panics
    ///
    /// Panics if `domain` is empty.
    pub fn convert(&self, domain: &ScalarSeries) -> Self {
        let Some(magnitude) = domain.last() else {
            panic!("cannot convert into an empty domain");
        };
        Self::interpolated_over(&self.data, &domain.data, magnitude)
    }
}

impl Index<usize> for ScalarSeries {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.data[index]
    }
}

impl AsRef<[f64]> for ScalarSeries {
    fn as_ref(&self) -> &[f64] {
        &self.data
    }
}

impl From<Vec<f64>> for ScalarSeries {
    fn from(data: Vec<f64>) -> Self {
        Self::from_values(data)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn assert_series_eq(series: &ScalarSeries, expected: &[f64]) {
        assert_eq!(series.len(), expected.len(), "length of {:?}", series);
        for (i, (a, b)) in series.iter().zip(expected).enumerate() {
            assert!(approx_eq(a, *b, 1e-9), "index {}: {} != {}", i, a, b);
        }
    }

    #[test]
    fn test_linear_ramp() {
        let series = ScalarSeries::interpolated(&[10.0, 20.0], &[0.0, 10.0], 11);
        let expected: Vec<f64> = (10..=20).map(|v| v as f64).collect();
        assert_series_eq(&series, &expected);
    }

    #[test]
    fn test_length_matches_domain() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        let keys = [0.3, 2.7, 2.7, 9.1, 40.0];
        for n in [1, 2, 7, 41, 100] {
            assert_eq!(ScalarSeries::interpolated(&values, &keys, n).len(), n);
        }
        assert!(ScalarSeries::interpolated(&values, &keys, 0).is_empty());
    }

    #[test]
    fn test_clamps_outside_keys() {
        let series = ScalarSeries::interpolated(&[5.0, 7.0], &[2.0, 4.0], 8);
        assert_series_eq(&series, &[5.0, 5.0, 5.0, 6.0, 7.0, 7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_reproduces_values_at_keys() {
        let values = [1.0, -2.0, 8.5, 3.25];
        let keys = [0.0, 3.0, 4.0, 9.0];
        let series = ScalarSeries::interpolated(&values, &keys, 10);
        for (value, key) in values.iter().zip(keys) {
            assert!(approx_eq(series[key as usize], *value, 1e-12));
        }
    }

    #[test]
    fn test_single_sample_is_constant() {
        let series = ScalarSeries::interpolated(&[1.2], &[30.0], 5);
        assert_series_eq(&series, &[1.2; 5]);
    }

    #[test]
    fn test_duplicate_keys_form_step() {
        // the jump happens just after key 2
        let series = ScalarSeries::interpolated(&[0.0, 0.0, 10.0, 10.0], &[0.0, 2.0, 2.0, 4.0], 5);
        assert_series_eq(&series, &[0.0, 0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    #[should_panic(expected = "empty sample set")]
    fn test_empty_samples_panic() {
        ScalarSeries::interpolated(&[], &[], 4);
    }

    #[test]
    #[should_panic(expected = "exactly one key")]
    fn test_mismatched_samples_panic() {
        ScalarSeries::interpolated(&[1.0, 2.0], &[0.0], 4);
    }

    #[test]
    fn test_interpolated_over_rounds_away_from_zero() {
        assert_eq!(ScalarSeries::interpolated_over(&[1.0], &[0.0], 3.2).len(), 4);
        assert_eq!(ScalarSeries::interpolated_over(&[1.0], &[0.0], 3.0).len(), 3);
        assert_eq!(ScalarSeries::interpolated_over(&[1.0], &[0.0], -2.0).len(), 0);
    }

    #[test]
    fn test_reducers() {
        let series = ScalarSeries::from_values(vec![4.0, 2.0, 9.0, 7.0]);
        assert_eq!(series.average(..), Some(5.5));
        assert_eq!(series.minimum(1..), Some(2.0));
        assert_eq!(series.maximum(..2), Some(4.0));
        assert_eq!(series.delta(1..=3), 5.0);
        assert_eq!(series.delta(..), 3.0);
    }

    #[test]
    fn test_reducers_empty_range() {
        let series = ScalarSeries::from_values(vec![4.0, 2.0, 9.0]);
        assert_eq!(series.average(2..2), None);
        assert_eq!(series.minimum(1..1), None);
        assert_eq!(series.maximum(0..0), None);
        assert_eq!(series.delta(1..1), 0.0);
    }

    #[test]
    fn test_step_height_and_stair_case() {
        let altitude = ScalarSeries::from_values(vec![100.0, 100.0, 105.0, 105.0]);
        let steps = altitude.step_height();
        assert_series_eq(&steps, &[0.0, 0.0, 5.0, 0.0]);

        let ascending = steps.clipping(0.0..=f64::INFINITY).stair_case();
        assert_series_eq(&ascending, &[0.0, 0.0, 5.0, 5.0]);

        let descending = steps.clipping(f64::NEG_INFINITY..=0.0).stair_case();
        assert_series_eq(&descending, &[0.0; 4]);
    }

    #[test]
    fn test_stair_case_inverts_step_height() {
        let original = ScalarSeries::from_values(vec![12.0, 15.5, 11.0, 20.25, 19.0]);
        let rebuilt = original.step_height().stair_case();
        for i in 0..original.len() {
            assert!(approx_eq(rebuilt[i] + original[0], original[i], 1e-12));
        }
    }

    #[test]
    fn test_step_height_empty() {
        assert!(ScalarSeries::from_values(vec![]).step_height().is_empty());
    }

    #[test]
    fn test_clipping() {
        let series = ScalarSeries::from_values(vec![-3.0, 0.5, 7.0]);
        assert_series_eq(&series.clipping(0.0..=1.0), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_derivative_of_ramp_is_constant() {
        let doubled = ScalarSeries::from_values(ScalarSeries::ramp(1000.0, 6).iter().map(|v| v * 2.0).collect());
        assert_series_eq(&doubled.derivative(), &[2.0; 6]);
    }

    #[test]
    fn test_derivative_resamples_midpoints() {
        // differences [1, 3] sit at 0.5 and 1.5
        let series = ScalarSeries::from_values(vec![0.0, 1.0, 4.0]);
        assert_series_eq(&series.derivative(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_derivative_short_series() {
        assert_series_eq(&ScalarSeries::from_values(vec![5.0]).derivative(), &[0.0]);
    }

    #[test]
    fn test_derivative_in_skips_flat_domain() {
        // distance pauses between positions 1 and 2
        let altitude = ScalarSeries::from_values(vec![0.0, 1.0, 1.0, 3.0]);
        let distance = ScalarSeries::from_values(vec![0.0, 10.0, 10.0, 30.0]);
        let grade = altitude.derivative_in(&distance);
        assert_eq!(grade.len(), 4);
        assert!(grade.iter().all(f64::is_finite));
        assert_series_eq(&grade, &[0.1, 0.1, 0.1, 0.1]);
    }

    #[test]
    fn test_derivative_in_constant_domain_is_zero() {
        let values = ScalarSeries::from_values(vec![1.0, 2.0, 3.0]);
        let flat = ScalarSeries::from_values(vec![5.0, 5.0, 5.0]);
        assert_series_eq(&values.derivative_in(&flat), &[0.0; 3]);
    }

    #[test]
    fn test_convert_to_distance_domain() {
        // constant 2 m/s for 5 seconds
        let distance = ScalarSeries::from_values(vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        let time = ScalarSeries::ramp(0.0, 5);

        let time_by_distance = time.convert(&distance);
        assert_eq!(time_by_distance.len(), 8);
        assert_series_eq(&time_by_distance, &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5]);
    }

    #[test]
    fn test_convert_rounds_partial_domain_up() {
        let distance = ScalarSeries::from_values(vec![0.0, 1.5, 2.5]);
        let values = ScalarSeries::from_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(values.convert(&distance).len(), 3);
    }

    #[test]
    #[should_panic(expected = "empty domain")]
    fn test_convert_empty_domain_panics() {
        let values = ScalarSeries::from_values(vec![]);
        values.convert(&ScalarSeries::from_values(vec![]));
    }
}
