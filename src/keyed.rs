//! # Keyed Workout Data
//!
//! A bundle of resampled workout series that all share one domain, together
//! with the [`DomainKey`] naming which member series defines that domain.
//!
//! A time-keyed bundle is assembled once from [`RawWorkoutData`]; a
//! distance-keyed bundle is derived from it with [`KeyedWorkoutData::rekey`].
//! Indices can be translated between the two with
//! [`convert_index`](KeyedWorkoutData::convert_index) and
//! [`convert_range`](KeyedWorkoutData::convert_range).
//!
//! ## Derived series
//!
//! | Series | Built from |
//! |--------|------------|
//! | distance | running sum of geodesic step distances |
//! | speed | derivative of distance (over time) |
//! | grade | derivative of altitude over distance |
//! | ascending | running sum of positive altitude steps |
//! | descending | running sum of negative altitude steps |

use std::fmt;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;

use crate::raw::{QuantitySample, RawWorkoutData};
use crate::series::domain_length;
use crate::stats::{PointStatistics, SegmentStatistics};
use crate::{CoordinateSeries, ScalarSeries};

/// The member series that defines the domain of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKey {
    /// One index per second
    Time,
    /// One index per meter traveled
    Distance,
}

impl DomainKey {
    /// The series holding the key values.
    pub fn series_id(self) -> SeriesId {
        match self {
            DomainKey::Time => SeriesId::Time,
            DomainKey::Distance => SeriesId::Distance,
        }
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.series_id(), f)
    }
}

/// Names the scalar series of a [`KeyedWorkoutData`].
///
/// The coordinate series is not scalar and is reached through
/// [`KeyedWorkoutData::coordinate`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesId {
    /// Seconds since the reference date
    Time,
    /// Meters from the start, along the route
    Distance,
    /// Meters above sea level
    Altitude,
    /// Meters per domain step (per second in the time domain)
    Speed,
    /// Altitude change per meter traveled
    Grade,
    /// Meters climbed since the start, never decreasing
    Ascending,
    /// Meters descended since the start, never increasing
    Descending,
    /// Beats per second
    HeartRate,
    /// Watts
    RunningPower,
    /// Watts
    CyclingPower,
}

impl SeriesId {
    pub const ALL: [SeriesId; 10] = [
        SeriesId::Time,
        SeriesId::Distance,
        SeriesId::Altitude,
        SeriesId::Speed,
        SeriesId::Grade,
        SeriesId::Ascending,
        SeriesId::Descending,
        SeriesId::HeartRate,
        SeriesId::RunningPower,
        SeriesId::CyclingPower,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SeriesId::Time => "time",
            SeriesId::Distance => "distance",
            SeriesId::Altitude => "altitude",
            SeriesId::Speed => "speed",
            SeriesId::Grade => "grade",
            SeriesId::Ascending => "ascending",
            SeriesId::Descending => "descending",
            SeriesId::HeartRate => "heart rate",
            SeriesId::RunningPower => "running power",
            SeriesId::CyclingPower => "cycling power",
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Workout series resampled onto one shared domain.
///
/// Every present series has [`count`](Self::count) elements and index `i`
/// of each refers to the same instant. Sensors that were not recorded are
/// `None`.
#[derive(Debug)]
pub struct KeyedWorkoutData {
    key: DomainKey,
    generation: u64,

    time: ScalarSeries,
    distance: Option<ScalarSeries>,

    altitude: Option<ScalarSeries>,
    coordinate: Option<CoordinateSeries>,
    speed: Option<ScalarSeries>,

    grade: Option<ScalarSeries>,
    ascending: Option<ScalarSeries>,
    descending: Option<ScalarSeries>,

    heart_rate: Option<ScalarSeries>,
    running_power: Option<ScalarSeries>,
    cycling_power: Option<ScalarSeries>,
}

/// Grade, ascending and descending, all derived from altitude.
struct ClimbSeries {
    grade: Option<ScalarSeries>,
    ascending: Option<ScalarSeries>,
    descending: Option<ScalarSeries>,
}

impl ClimbSeries {
    fn derive(altitude: Option<&ScalarSeries>, distance: Option<&ScalarSeries>) -> Self {
        let climbing = altitude.map(ScalarSeries::step_height);
        let grade = match (altitude, distance) {
            (Some(altitude), Some(distance)) => Some(altitude.derivative_in(distance)),
            _ => None,
        };

        Self {
            grade,
            ascending: climbing
                .as_ref()
                .map(|steps| steps.clipping(0.0..=f64::INFINITY).stair_case()),
            descending: climbing
                .as_ref()
                .map(|steps| steps.clipping(f64::NEG_INFINITY..=0.0).stair_case()),
        }
    }
}

/// Sort `(key, value)` pairs by key and split them into parallel buffers.
fn sorted_samples<V>(mut samples: Vec<(f64, V)>) -> (Vec<f64>, Vec<V>) {
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    samples.into_iter().unzip()
}

/// Resample discrete sensor readings, keyed by their start time.
fn quantity_series(samples: &[QuantitySample], start_time: f64, domain_magnitude: usize) -> Option<ScalarSeries> {
    if samples.is_empty() {
        return None;
    }
    let (keys, values) = sorted_samples(
        samples
            .iter()
            .map(|sample| (sample.start_time - start_time, sample.value))
            .collect(),
    );
    Some(ScalarSeries::interpolated(&values, &keys, domain_magnitude))
}

impl KeyedWorkoutData {
    /// Assemble the time-keyed bundle for a workout.
    ///
    /// The domain has one index per whole second of `[start_time, end_time]`
    /// (rounded away from zero). Location fixes and sensor samples may arrive
    /// in any order; they are sorted by timestamp before resampling. Fixes
    /// with a negative accuracy or an invalid value are ignored for the
    /// affected series.
    ///
    /// # Panics
    ///
    /// Panics if the workout does not span at least part of a second. Use
    /// [`WorkoutAnalysis::try_new`](crate::WorkoutAnalysis::try_new) to get an
    /// error instead.
    pub fn time_keyed(raw: &RawWorkoutData) -> Self {
        let start_time = raw.start_time;
        let domain_magnitude = domain_length(raw.duration());
        assert!(
            domain_magnitude > 0,
            "workout [{}, {}] has an empty time domain",
            raw.start_time,
            raw.end_time
        );

        let time = ScalarSeries::ramp(start_time, domain_magnitude);

        let (altitude_keys, altitude_values) = sorted_samples(
            raw.locations
                .iter()
                .filter(|fix| fix.has_valid_altitude())
                .map(|fix| (fix.timestamp - start_time, fix.altitude))
                .collect(),
        );
        let (coordinate_keys, coordinate_values) = sorted_samples(
            raw.locations
                .iter()
                .filter(|fix| fix.has_valid_coordinate())
                .map(|fix| (fix.timestamp - start_time, fix.coordinate()))
                .collect(),
        );

        let altitude = (!altitude_values.is_empty())
            .then(|| ScalarSeries::interpolated(&altitude_values, &altitude_keys, domain_magnitude));
        let coordinate = (!coordinate_values.is_empty())
            .then(|| CoordinateSeries::interpolated(&coordinate_values, &coordinate_keys, domain_magnitude));

        let distance = coordinate.as_ref().map(|c| c.step_height().stair_case());
        let speed = distance.as_ref().map(ScalarSeries::derivative);
        let climb = ClimbSeries::derive(altitude.as_ref(), distance.as_ref());

        let data = Self {
            key: DomainKey::Time,
            generation: next_generation(),
            time,
            distance,
            altitude,
            coordinate,
            speed,
            grade: climb.grade,
            ascending: climb.ascending,
            descending: climb.descending,
            heart_rate: quantity_series(&raw.heart_rates, start_time, domain_magnitude),
            running_power: quantity_series(&raw.running_power, start_time, domain_magnitude),
            cycling_power: quantity_series(&raw.cycling_power, start_time, domain_magnitude),
        };

        debug!(
            "[KeyedWorkoutData] Built time domain: {} samples from {} fixes, series: {}",
            data.count(),
            raw.locations.len(),
            data.present_series_names()
        );

        data
    }

    /// Re-express every series of `source` over the domain of its `key` series.
    ///
    /// Time, distance, altitude, coordinate, heart rate and power are
    /// converted directly. Speed, grade, ascending and descending are derived
    /// again in the new domain so that they stay rates with respect to time
    /// and distance.
    ///
    /// The new domain starts at the first key value of `source`, so time
    /// re-keys from the workout start rather than the reference date.
    ///
    /// Returns `None` if `source` has no `key` series (e.g. a workout without
    /// GPS re-keyed by distance), or if the key never advances by any amount
    /// (a single fix or a stationary track re-keyed by distance).
    pub fn rekey(source: &KeyedWorkoutData, key: DomainKey) -> Option<Self> {
        let key_series = source.series(key.series_id())?;
        let origin = key_series.first()?;
        let span = key_series.last()? - origin;
        if domain_length(span) == 0 {
            debug!(
                "[KeyedWorkoutData] Not re-keying by {}: key spans {} from {}",
                key, span, origin
            );
            return None;
        }
        let domain = &ScalarSeries::from_values(key_series.iter().map(|v| v - origin).collect());

        let time = source.time.convert(domain);
        let distance = source.distance.as_ref().map(|s| s.convert(domain));
        let altitude = source.altitude.as_ref().map(|s| s.convert(domain));

        let speed = distance.as_ref().map(|d| d.derivative_in(&time));
        let climb = ClimbSeries::derive(altitude.as_ref(), distance.as_ref());

        let data = Self {
            key,
            generation: next_generation(),
            distance,
            altitude,
            coordinate: source.coordinate.as_ref().map(|c| c.convert(domain)),
            speed,
            grade: climb.grade,
            ascending: climb.ascending,
            descending: climb.descending,
            heart_rate: source.heart_rate.as_ref().map(|s| s.convert(domain)),
            running_power: source.running_power.as_ref().map(|s| s.convert(domain)),
            cycling_power: source.cycling_power.as_ref().map(|s| s.convert(domain)),
            time,
        };

        debug!(
            "[KeyedWorkoutData] Re-keyed {} samples by {} into {} samples",
            source.count(),
            key,
            data.count()
        );

        Some(data)
    }

    fn present_series_names(&self) -> String {
        let mut names: Vec<&str> = SeriesId::ALL
            .iter()
            .filter(|id| self.series(**id).is_some())
            .map(|id| id.name())
            .collect();
        if self.coordinate.is_some() {
            names.push("coordinate");
        }
        names.join(", ")
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Which series defines the domain of this bundle.
    pub fn key(&self) -> DomainKey {
        self.key
    }

    /// Identity token, unique per constructed bundle within the process.
    ///
    /// Two handles to the same bundle have the same generation; a rebuilt
    /// bundle never reuses one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The series that defines the domain of this bundle.
    pub fn key_series(&self) -> Option<&ScalarSeries> {
        self.series(self.key.series_id())
    }

    /// Look up a scalar series by name.
    pub fn series(&self, id: SeriesId) -> Option<&ScalarSeries> {
        match id {
            SeriesId::Time => Some(&self.time),
            SeriesId::Distance => self.distance.as_ref(),
            SeriesId::Altitude => self.altitude.as_ref(),
            SeriesId::Speed => self.speed.as_ref(),
            SeriesId::Grade => self.grade.as_ref(),
            SeriesId::Ascending => self.ascending.as_ref(),
            SeriesId::Descending => self.descending.as_ref(),
            SeriesId::HeartRate => self.heart_rate.as_ref(),
            SeriesId::RunningPower => self.running_power.as_ref(),
            SeriesId::CyclingPower => self.cycling_power.as_ref(),
        }
    }

    pub fn time(&self) -> &ScalarSeries {
        &self.time
    }

    pub fn distance(&self) -> Option<&ScalarSeries> {
        self.distance.as_ref()
    }

    pub fn altitude(&self) -> Option<&ScalarSeries> {
        self.altitude.as_ref()
    }

    pub fn coordinate(&self) -> Option<&CoordinateSeries> {
        self.coordinate.as_ref()
    }

    pub fn speed(&self) -> Option<&ScalarSeries> {
        self.speed.as_ref()
    }

    pub fn grade(&self) -> Option<&ScalarSeries> {
        self.grade.as_ref()
    }

    pub fn ascending(&self) -> Option<&ScalarSeries> {
        self.ascending.as_ref()
    }

    pub fn descending(&self) -> Option<&ScalarSeries> {
        self.descending.as_ref()
    }

    pub fn heart_rate(&self) -> Option<&ScalarSeries> {
        self.heart_rate.as_ref()
    }

    pub fn running_power(&self) -> Option<&ScalarSeries> {
        self.running_power.as_ref()
    }

    pub fn cycling_power(&self) -> Option<&ScalarSeries> {
        self.cycling_power.as_ref()
    }

    /// Number of indices shared by every series.
    #[inline]
    pub fn count(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    #[inline]
    pub fn indices(&self) -> Range<usize> {
        0..self.count()
    }

    /// Every series value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn point(&self, index: usize) -> PointStatistics<'_> {
        assert!(index < self.count(), "index {} out of bounds ({})", index, self.count());
        PointStatistics::new(self, index)
    }

    /// Aggregates over `range`.
    ///
    /// # Panics
    ///
    /// Panics if `range` extends past [`count`](Self::count).
    pub fn segment(&self, range: Range<usize>) -> SegmentStatistics<'_> {
        assert!(
            range.start <= range.end && range.end <= self.count(),
            "range {:?} out of bounds ({})",
            range,
            self.count()
        );
        SegmentStatistics::new(self, range)
    }

    /// Aggregates over the range of `self` that best represents `range` in `source`.
    pub fn segment_converting(&self, range: Range<usize>, source: &KeyedWorkoutData) -> SegmentStatistics<'_> {
        self.segment(self.convert_range(range, source))
    }

    // ========================================================================
    // Index Selection
    // ========================================================================

    /// The index nearest `floating_index`, clamped to `0..=count` so that it
    /// can serve as a half-open upper bound.
    pub fn best_half_open_index(&self, floating_index: f64) -> usize {
        let nearest = floating_index.round();
        if nearest <= 0.0 {
            0
        } else {
            (nearest as usize).min(self.count())
        }
    }

    /// The valid index nearest `floating_index`.
    ///
    /// # Panics
    ///
    /// Panics if the bundle is empty.
    pub fn best_closed_index(&self, floating_index: f64) -> usize {
        assert!(!self.is_empty(), "no index in an empty bundle");
        let nearest = floating_index.round();
        if nearest <= 0.0 {
            0
        } else {
            (nearest as usize).min(self.count() - 1)
        }
    }

    /// The valid index at `percent` of the domain: `0.0` is the first index,
    /// `1.0` the last.
    ///
    /// # Panics
    ///
    /// Panics if the bundle is empty.
    pub fn index_for_percent(&self, percent: f64) -> usize {
        self.best_closed_index(percent * self.count() as f64)
    }

    // ========================================================================
    // Cross-Domain Conversion
    // ========================================================================

    /// The index of `self` that best represents `index` in `source`.
    ///
    /// The key value of `source` at `index` is offset by the first key value
    /// of `self` and rounded to the nearest valid index.
    ///
    /// # Panics
    ///
    /// Panics if either bundle lacks the key series of `self`, if `self` is
    /// empty, or if `index` is out of bounds for `source`.
    pub fn convert_index(&self, index: usize, source: &KeyedWorkoutData) -> usize {
        let id = self.key.series_id();
        let (Some(unit), Some(query)) = (self.series(id), source.series(id)) else {
            panic!("converting index from data that does not have the {} series", id);
        };

        let offset = query[index];
        let base = unit[0];

        self.best_closed_index(offset - base)
    }

    /// The range of `self` that best represents `range` in `source`.
    ///
    /// The first and last elements of `range` are converted independently.
    /// The upper bound itself may be out of bounds, or sit on the far side of
    /// a pause where the key jumps. An empty range converts to an empty range.
    pub fn convert_range(&self, range: Range<usize>, source: &KeyedWorkoutData) -> Range<usize> {
        if range.is_empty() {
            let lower = self.convert_index(range.start.min(source.count().saturating_sub(1)), source);
            return lower..lower;
        }

        let lower = self.convert_index(range.start, source);
        let upper = self.convert_index(range.end - 1, source);
        lower..(upper + 1)
    }
}

impl PartialEq for KeyedWorkoutData {
    /// Bundles are equal when they are the same construction.
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation
    }
}

impl Eq for KeyedWorkoutData {}

// ============================================================================
// Tests
// ============================================================================
