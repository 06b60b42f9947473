//! # Graph Guides
//!
//! Reduce a dense series to roughly one point per few pixels and map between
//! series indices, values and pixel coordinates.
//!
//! ## Algorithm
//!
//! 1. The decimation factor is `ceil(smoothing * count / width)`, so at most
//!    `width / smoothing` points are drawn
//! 2. The series is convolved with a box filter of that width and sampled at
//!    the same stride
//! 3. The value range of the decimated points is scaled onto the drawable
//!    height; a flat series gets a small synthetic range instead
//!
//! Pixel coordinates put the origin at the top left, so larger values are
//! drawn closer to the top.

use std::collections::HashMap;
use std::ops::Range;

use log::debug;

use crate::{AnalysisError, KeyedWorkoutData, SeriesId};

/// Default ratio of pixels to drawn points.
pub const DEFAULT_SMOOTHING_COEFFICIENT: f64 = 3.0;

/// Relative margin used to widen a flat value range.
const FLAT_RANGE_MARGIN: f64 = 0.01;

/// Dimensions of a drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space to leave empty on each side of a drawing area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right }
    }

    /// The same inset on every side.
    pub fn uniform(inset: f64) -> Self {
        Self::new(inset, inset, inset, inset)
    }
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Drawing parameters shared by every guide over the same range.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    size: Size,
    insets: EdgeInsets,
    effective_size: Size,
    smoothing_coefficient: f64,
    filter: Vec<f64>,
}

impl GraphConfig {
    /// Configuration for drawing `data_count` values into `size`, leaving
    /// `insets` empty.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidGraphSize`] if the insets leave no
    /// drawable area, and [`AnalysisError::InvalidSmoothing`] if
    /// `smoothing_coefficient` is not a positive number.
    ///
    /// # Example
    ///
    /// ```rust
    /// use workout_series::{EdgeInsets, GraphConfig, Size, DEFAULT_SMOOTHING_COEFFICIENT};
    ///
    /// let config = GraphConfig::new(
    ///     3600,
    ///     Size::new(320.0, 120.0),
    ///     EdgeInsets::default(),
    ///     DEFAULT_SMOOTHING_COEFFICIENT,
    /// )
    /// .unwrap();
    /// assert_eq!(config.decimation_factor(), 34);
    /// ```
    pub fn new(
        data_count: usize,
        size: Size,
        insets: EdgeInsets,
        smoothing_coefficient: f64,
    ) -> Result<Self, AnalysisError> {
        let effective_size = Size::new(
            size.width - (insets.left + insets.right),
            size.height - (insets.top + insets.bottom),
        );
        let drawable = |v: f64| v.is_finite() && v > 0.0;
        if !drawable(effective_size.width) || !drawable(effective_size.height) {
            return Err(AnalysisError::InvalidGraphSize {
                width: effective_size.width,
                height: effective_size.height,
            });
        }
        if !drawable(smoothing_coefficient) {
            return Err(AnalysisError::InvalidSmoothing(smoothing_coefficient));
        }

        let minimum_factor = smoothing_coefficient * data_count as f64 / effective_size.width;
        let factor = (minimum_factor.ceil() as usize).max(1);

        Ok(Self {
            size,
            insets,
            effective_size,
            smoothing_coefficient,
            filter: box_filter(factor),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn insets(&self) -> EdgeInsets {
        self.insets
    }

    /// `size` minus `insets`.
    pub fn effective_size(&self) -> Size {
        self.effective_size
    }

    pub fn smoothing_coefficient(&self) -> f64 {
        self.smoothing_coefficient
    }

    /// Number of series values averaged into each drawn point.
    pub fn decimation_factor(&self) -> usize {
        self.filter.len()
    }

    /// Filter taps, each `1 / decimation_factor`.
    pub fn filter(&self) -> &[f64] {
        &self.filter
    }
}

fn box_filter(factor: usize) -> Vec<f64> {
    vec![1.0 / factor as f64; factor]
}

/// `out[n] = sum(series[n * factor + p] * filter[p])`
fn downsample(series: &[f64], filter: &[f64]) -> Vec<f64> {
    let factor = filter.len();
    let count = (series.len() - factor) / factor + 1;
    (0..count)
        .map(|n| {
            series[n * factor..n * factor + factor]
                .iter()
                .zip(filter)
                .map(|(value, tap)| value * tap)
                .sum()
        })
        .collect()
}

/// Widen a value range that is too narrow to scale onto pixels.
fn drawable_range(minimum: f64, maximum: f64) -> (f64, f64) {
    if minimum == 0.0 && maximum == 0.0 {
        return (-1.0, 1.0);
    }
    if maximum - minimum < f64::EPSILON {
        let away_from_zero = 1.0 + FLAT_RANGE_MARGIN;
        let closer_to_zero = 1.0 - FLAT_RANGE_MARGIN;
        let maximum = maximum * if maximum > 0.0 { away_from_zero } else { closer_to_zero };
        let minimum = minimum * if minimum > 0.0 { closer_to_zero } else { away_from_zero };
        return (minimum, maximum);
    }
    (minimum, maximum)
}

/// One decimated series laid out in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphGuide {
    size: Size,
    insets: EdgeInsets,
    path: Vec<PixelPoint>,
    minimum_value: f64,
    maximum_value: f64,
    decimated: Vec<f64>,
    decimation_factor: usize,
    x_scale: f64,
    y_scale: f64,
}

impl GraphGuide {
    /// Decimate `series` and lay it out according to `config`.
    ///
    /// A factor larger than the series is reduced to the series length, which
    /// draws a single averaged point.
    ///
    /// # Panics
    ///
    /// Panics if `series` is empty.
    pub fn new(series: &[f64], config: &GraphConfig) -> Self {
        assert!(!series.is_empty(), "cannot graph an empty series");

        let decimation_factor = config.decimation_factor().min(series.len());
        let decimated = if decimation_factor == config.decimation_factor() {
            downsample(series, config.filter())
        } else {
            downsample(series, &box_filter(decimation_factor))
        };

        let lowest = decimated.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = decimated.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (minimum_value, maximum_value) = drawable_range(lowest, highest);

        let size = config.size();
        let insets = config.insets();
        let effective = config.effective_size();
        let x_scale = effective.width / decimated.len() as f64;
        let y_scale = effective.height / (maximum_value - minimum_value);

        let path = decimated
            .iter()
            .enumerate()
            .map(|(n, value)| PixelPoint {
                x: insets.left + n as f64 * x_scale,
                y: size.height - insets.bottom - (value - minimum_value) * y_scale,
            })
            .collect();

        debug!(
            "[GraphGuide] Decimated {} values by {} into {} points, range [{:.3}, {:.3}]",
            series.len(),
            decimation_factor,
            decimated.len(),
            minimum_value,
            maximum_value
        );

        Self {
            size,
            insets,
            path,
            minimum_value,
            maximum_value,
            decimated,
            decimation_factor,
            x_scale,
            y_scale,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn insets(&self) -> EdgeInsets {
        self.insets
    }

    /// The polyline to draw, one point per decimated value.
    pub fn path(&self) -> &[PixelPoint] {
        &self.path
    }

    /// Lowest value on the vertical axis. May differ from the minimum of
    /// the series because of smoothing.
    pub fn minimum_value(&self) -> f64 {
        self.minimum_value
    }

    /// Highest value on the vertical axis. May differ from the maximum of
    /// the series because of smoothing.
    pub fn maximum_value(&self) -> f64 {
        self.maximum_value
    }

    pub fn decimation_factor(&self) -> usize {
        self.decimation_factor
    }

    fn x_for_decimated_index(&self, index: f64) -> f64 {
        index * self.x_scale + self.insets.left
    }

    /// Vertical pixel position of `value`.
    pub fn y_for_value(&self, value: f64) -> f64 {
        self.size.height - self.insets.bottom - (value - self.minimum_value) * self.y_scale
    }

    /// The value drawn at horizontal position `x`, interpolated between
    /// neighboring points. Positions outside the graph give the nearest end.
    pub fn value_at_x(&self, x: f64) -> f64 {
        let decimated_index = (x - self.insets.left) / self.x_scale;
        let lower = decimated_index.floor();
        let upper = decimated_index.ceil();
        let last = self.decimated.len() - 1;

        if lower < 0.0 {
            return self.decimated[0];
        }
        if upper > last as f64 {
            return self.decimated[last];
        }

        let low = self.decimated[lower as usize];
        let high = self.decimated[upper as usize];
        low + (high - low) * (decimated_index - lower)
    }

    pub fn y_for_x(&self, x: f64) -> f64 {
        self.y_for_value(self.value_at_x(x))
    }

    /// Horizontal pixel position of `series[offset]`.
    pub fn x_for_offset(&self, offset: usize) -> f64 {
        self.x_for_decimated_index(offset as f64 / self.decimation_factor as f64)
    }

    /// The fractional series offset drawn at horizontal position `x`.
    pub fn offset_for_x(&self, x: f64) -> f64 {
        (x - self.insets.left) / self.x_scale * self.decimation_factor as f64
    }

    /// The point on the drawn line above `series[offset]`.
    pub fn point_for_offset(&self, offset: usize) -> PixelPoint {
        let x = self.x_for_offset(offset);
        PixelPoint { x, y: self.y_for_x(x) }
    }
}

/// Lazily built guides for the series of one bundle, all sharing one range
/// and one [`GraphConfig`].
#[derive(Debug)]
pub struct GraphGuides<'a> {
    data: &'a KeyedWorkoutData,
    range: Range<usize>,
    config: GraphConfig,
    cache: HashMap<SeriesId, GraphGuide>,
}

impl<'a> GraphGuides<'a> {
    /// Guides for `range` of `data` drawn into `size`, with the default
    /// smoothing coefficient.
    ///
    /// # Panics
    ///
    /// Panics if `range` extends past the end of `data`.
    pub fn new(
        data: &'a KeyedWorkoutData,
        range: Range<usize>,
        size: Size,
        insets: EdgeInsets,
    ) -> Result<Self, AnalysisError> {
        let config = GraphConfig::new(range.len(), size, insets, DEFAULT_SMOOTHING_COEFFICIENT)?;
        Ok(Self::with_config(data, range, config))
    }

    /// # Panics
    ///
    /// Panics if `range` extends past the end of `data`.
    pub fn with_config(data: &'a KeyedWorkoutData, range: Range<usize>, config: GraphConfig) -> Self {
        assert!(
            range.end <= data.count(),
            "graph range {:?} out of bounds ({})",
            range,
            data.count()
        );
        Self {
            data,
            range,
            config,
            cache: HashMap::new(),
        }
    }

    /// The guide for series `id`, built on first use.
    ///
    /// `None` if the series was not recorded or the range is empty.
    pub fn guide(&mut self, id: SeriesId) -> Option<&GraphGuide> {
        if self.range.is_empty() {
            return None;
        }
        if !self.cache.contains_key(&id) {
            let series = self.data.series(id)?;
            let guide = GraphGuide::new(series.slice(self.range.clone()), &self.config);
            self.cache.insert(id, guide);
        }
        self.cache.get(&id)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Generation of the bundle these guides draw.
    pub fn generation(&self) -> u64 {
        self.data.generation()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QuantitySample, RawWorkoutData};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn config(data_count: usize, width: f64, smoothing: f64) -> GraphConfig {
        GraphConfig::new(data_count, Size::new(width, 50.0), EdgeInsets::default(), smoothing).unwrap()
    }

    #[test]
    fn test_decimation_factor() {
        assert_eq!(config(1000, 300.0, 3.0).decimation_factor(), 10);
        assert_eq!(config(1001, 300.0, 3.0).decimation_factor(), 11);
        assert_eq!(config(10, 300.0, 3.0).decimation_factor(), 1);
        assert_eq!(config(0, 300.0, 3.0).decimation_factor(), 1);

        let inset = GraphConfig::new(
            1000,
            Size::new(320.0, 50.0),
            EdgeInsets::new(0.0, 12.0, 0.0, 8.0),
            3.0,
        )
        .unwrap();
        assert_eq!(inset.effective_size(), Size::new(300.0, 50.0));
        assert_eq!(inset.decimation_factor(), 10);
        assert!(inset.filter().iter().all(|tap| *tap == 0.1));
    }

    #[test]
    fn test_invalid_config() {
        let no_room = GraphConfig::new(10, Size::new(20.0, 50.0), EdgeInsets::uniform(10.0), 3.0);
        assert!(matches!(no_room, Err(AnalysisError::InvalidGraphSize { .. })));

        let nan = GraphConfig::new(10, Size::new(f64::NAN, 50.0), EdgeInsets::default(), 3.0);
        assert!(matches!(nan, Err(AnalysisError::InvalidGraphSize { .. })));

        let smoothing = GraphConfig::new(10, Size::new(100.0, 50.0), EdgeInsets::default(), 0.0);
        assert!(matches!(smoothing, Err(AnalysisError::InvalidSmoothing(_))));
    }

    #[test]
    fn test_factor_and_point_count_bounds() {
        let width = 200.0;
        let smoothing = 3.0;
        let mut previous_factor = 0;
        for length in (1..5000).step_by(37) {
            let config = config(length, width, smoothing);
            let factor = config.decimation_factor();
            assert!(factor >= previous_factor, "factor shrank at {}", length);
            previous_factor = factor;

            let series: Vec<f64> = (0..length).map(|i| i as f64).collect();
            let guide = GraphGuide::new(&series, &config);
            assert!(guide.path().len() as f64 <= (width / smoothing).ceil(), "{} points for {}", guide.path().len(), length);
        }
    }

    #[test]
    fn test_box_filter_averages() {
        let guide = GraphGuide::new(&[1.0, 3.0, 5.0, 7.0, 9.0, 11.0], &config(6, 6.0, 2.0));
        assert_eq!(guide.decimation_factor(), 2);
        assert_eq!(guide.path().len(), 3);
        assert!(approx_eq(guide.minimum_value(), 2.0, 1e-12));
        assert!(approx_eq(guide.maximum_value(), 10.0, 1e-12));
        assert!(approx_eq(guide.x_for_offset(4), 4.0, 1e-12));
        assert!(approx_eq(guide.offset_for_x(4.0), 4.0, 1e-12));
    }

    #[test]
    fn test_trailing_values_beyond_last_window_are_dropped() {
        // 7 values with a factor of 2 leave the last one out
        let guide = GraphGuide::new(&[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 100.0], &config(7, 7.0, 2.0));
        assert_eq!(guide.path().len(), 3);
        assert!(approx_eq(guide.maximum_value(), 3.0, 1e-12));
    }

    #[test]
    fn test_factor_clamped_to_series() {
        let guide = GraphGuide::new(&[2.0, 4.0, 6.0], &config(3000, 100.0, 3.0));
        assert_eq!(guide.decimation_factor(), 3);
        assert_eq!(guide.path().len(), 1);
        assert!(approx_eq(guide.value_at_x(50.0), 4.0, 1e-12));
    }

    #[test]
    fn test_pixel_mapping() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let guide = GraphGuide::new(&series, &config(10, 100.0, 1.0));

        let path = guide.path();
        assert_eq!(path.len(), 10);
        assert_eq!(path[0], PixelPoint { x: 0.0, y: 50.0 });
        assert!(approx_eq(path[9].x, 90.0, 1e-12));
        assert!(approx_eq(path[9].y, 0.0, 1e-12));

        assert!(approx_eq(guide.value_at_x(15.0), 1.5, 1e-12));
        assert!(approx_eq(guide.value_at_x(-5.0), 0.0, 1e-12));
        assert!(approx_eq(guide.value_at_x(1000.0), 9.0, 1e-12));
        assert!(approx_eq(guide.y_for_value(4.5), 25.0, 1e-12));
        assert!(approx_eq(guide.y_for_x(45.0), 25.0, 1e-12));

        assert!(approx_eq(guide.x_for_offset(3), 30.0, 1e-12));
        assert!(approx_eq(guide.offset_for_x(30.0), 3.0, 1e-12));
        let point = guide.point_for_offset(7);
        assert!(approx_eq(point.x, 70.0, 1e-12));
        assert!(approx_eq(point.y, path[7].y, 1e-12));
    }

    #[test]
    fn test_insets_shift_pixels() {
        let series: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let config = GraphConfig::new(10, Size::new(110.0, 60.0), EdgeInsets::new(4.0, 10.0, 6.0, 0.0), 1.0).unwrap();
        let guide = GraphGuide::new(&series, &config);

        assert_eq!(guide.path()[0], PixelPoint { x: 10.0, y: 54.0 });
        assert!(approx_eq(guide.path()[9].y, 4.0, 1e-12));
        assert!(approx_eq(guide.offset_for_x(40.0), 3.0, 1e-12));
    }

    #[test]
    fn test_flat_series_gets_widened_range() {
        let guide = GraphGuide::new(&[1.2; 500], &config(500, 100.0, 3.0));
        assert!(approx_eq(guide.minimum_value(), 1.2 * 0.99, 1e-12));
        assert!(approx_eq(guide.maximum_value(), 1.2 * 1.01, 1e-12));
        assert!(guide.path().iter().all(|p| p.y.is_finite()));
        assert!(approx_eq(guide.y_for_value(1.2), 25.0, 1e-9));
    }

    #[test]
    fn test_flat_negative_and_zero_series() {
        let negative = GraphGuide::new(&[-2.0; 10], &config(10, 100.0, 3.0));
        assert!(approx_eq(negative.minimum_value(), -2.02, 1e-12));
        assert!(approx_eq(negative.maximum_value(), -1.98, 1e-12));

        let zero = GraphGuide::new(&[0.0; 10], &config(10, 100.0, 3.0));
        assert_eq!(zero.minimum_value(), -1.0);
        assert_eq!(zero.maximum_value(), 1.0);
    }

    #[test]
    #[should_panic(expected = "empty series")]
    fn test_empty_series_panics() {
        GraphGuide::new(&[], &config(0, 100.0, 3.0));
    }

    fn flat_heart_rate_workout() -> KeyedWorkoutData {
        let mut raw = RawWorkoutData::new(0.0, 600.0);
        raw.heart_rates = vec![QuantitySample::new(1.2, 30.0, 30.0)];
        KeyedWorkoutData::time_keyed(&raw)
    }

    #[test]
    fn test_guides_are_memoized() {
        let data = flat_heart_rate_workout();
        let mut guides = GraphGuides::new(&data, 0..600, Size::new(200.0, 80.0), EdgeInsets::default()).unwrap();
        assert_eq!(guides.config().decimation_factor(), 9);
        assert_eq!(guides.generation(), data.generation());

        let first = guides.guide(SeriesId::HeartRate).unwrap() as *const GraphGuide;
        let second = guides.guide(SeriesId::HeartRate).unwrap() as *const GraphGuide;
        assert!(std::ptr::eq(first, second));

        let heart_rate = guides.guide(SeriesId::HeartRate).unwrap();
        assert!(heart_rate.maximum_value() > heart_rate.minimum_value());

        assert!(guides.guide(SeriesId::RunningPower).is_none());
        assert!(guides.guide(SeriesId::Time).is_some());
    }

    #[test]
    fn test_guides_empty_range() {
        let data = flat_heart_rate_workout();
        let mut guides = GraphGuides::new(&data, 100..100, Size::new(200.0, 80.0), EdgeInsets::default()).unwrap();
        assert!(guides.guide(SeriesId::HeartRate).is_none());
    }
}
