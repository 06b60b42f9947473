//! # Coordinate Series
//!
//! The GPS counterpart of [`ScalarSeries`]: a dense series of
//! [`GpsPoint`]s over a uniform domain. Resampling moves along great circles
//! rather than straight lines in latitude/longitude, and the step "height"
//! between neighbors is a geodesic distance in meters.

use std::ops::{Index, RangeBounds};

use geo::{Coord, LineString};

use crate::geo_utils::{compute_bounds, great_circle_interpolate, step_distance};
use crate::series::{bounds_of, domain_length, resample, Interpolate};
use crate::{Bounds, GpsPoint, ScalarSeries};

impl Interpolate for GpsPoint {
    #[inline]
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        great_circle_interpolate(self, other, t)
    }
}

/// A dense series of coordinates over a uniform domain.
///
/// # Example
///
/// ```rust
/// use workout_series::{CoordinateSeries, GpsPoint};
///
/// let track = CoordinateSeries::interpolated(
///     &[GpsPoint::new(0.0, 0.0), GpsPoint::new(0.0, 1.0)],
///     &[0.0, 10.0],
///     11,
/// );
/// assert_eq!(track.len(), 11);
/// assert!((track[5].longitude - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSeries {
    data: Vec<GpsPoint>,
}

impl CoordinateSeries {
    /// Resample `values` (observed at `keys`) onto `domain_magnitude` uniform positions.
    ///
    /// Keys must be sorted ascending; see [`ScalarSeries::interpolated`].
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty or if `values` and `keys` differ in length.
    pub fn interpolated(values: &[GpsPoint], keys: &[f64], domain_magnitude: usize) -> Self {
        Self { data: resample(values, keys, domain_magnitude) }
    }

    /// Like [`interpolated`](Self::interpolated) with a real domain magnitude,
    /// rounded away from zero.
    pub fn interpolated_over(values: &[GpsPoint], keys: &[f64], domain_magnitude: f64) -> Self {
        Self::interpolated(values, keys, domain_length(domain_magnitude))
    }

    /// Wrap an already-dense buffer.
    pub fn from_values(data: Vec<GpsPoint>) -> Self {
        Self { data }
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
    pub fn get(&self, index: usize) -> Option<GpsPoint> {
        self.data.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[GpsPoint] {
        &self.data
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = GpsPoint> + '_ {
        self.data.iter().copied()
    }

    /// The coordinates within `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[GpsPoint] {
        &self.data[bounds_of(&range)]
    }

    /// Distance in meters from the previous coordinate at every position;
    /// the first is 0.
    ///
    /// Summing the result with [`ScalarSeries::stair_case`] gives the
    /// distance traveled along the track.
    pub fn step_height(&self) -> ScalarSeries {
        let mut steps = Vec::with_capacity(self.len());
        if !self.is_empty() {
            steps.push(0.0);
        }
        steps.extend(self.data.windows(2).map(|w| step_distance(&w[0], &w[1])));
        ScalarSeries::from_values(steps)
    }

    /// Express this track over the domain described by `domain`.
    ///
    /// See [`ScalarSeries::convert`].
    ///
    /// # Panics
    ///
    /// Panics if `domain` is empty.
    pub fn convert(&self, domain: &ScalarSeries) -> Self {
        let Some(magnitude) = domain.last() else {
            panic!("cannot convert into an empty domain");
        };
        Self::interpolated_over(&self.data, domain.as_slice(), magnitude)
    }

    /// Bounding box of the coordinates within `range`, `None` if it is empty.
    pub fn bounds<R: RangeBounds<usize>>(&self, range: R) -> Option<Bounds> {
        compute_bounds(self.slice(range))
    }

    /// The coordinates within `range` as a `geo` line string (x = longitude,
    /// y = latitude), ready for map overlays.
    pub fn route<R: RangeBounds<usize>>(&self, range: R) -> LineString<f64> {
        self.slice(range)
            .iter()
            .map(|p| Coord { x: p.longitude, y: p.latitude })
            .collect()
    }
}

impl Index<usize> for CoordinateSeries {
    type Output = GpsPoint;

    #[inline]
    fn index(&self, index: usize) -> &GpsPoint {
        &self.data[index]
    }
}

impl AsRef<[GpsPoint]> for CoordinateSeries {
    fn as_ref(&self) -> &[GpsPoint] {
        &self.data
    }
}

// ============================================================================
// Tests
// ============================================================================
