//! # Workout Series
//!
//! Resampling, geodesy and domain re-keying for recorded workout sensor data.
//!
//! This library provides:
//! - Dense, uniformly indexed series built from sparse, unevenly spaced samples
//! - Great-circle interpolation and ellipsoid-aware step distances for GPS tracks
//! - A bundle of derived workout series (distance, speed, grade, climbing)
//!   that can be re-expressed over distance instead of time
//! - Decimated graph guides with index/pixel mapping for rendering
//!
//! ## Features
//!
//! - **`parallel`** - Analyze many workouts at once with rayon
//! - **`archive`** - JSON archiving of raw workout data
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use workout_series::{DomainKey, LocationFix, QuantitySample, RawWorkoutData, WorkoutAnalysis};
//!
//! // Two minutes heading north, one fix every ten seconds
//! let mut raw = RawWorkoutData::new(0.0, 120.0);
//! raw.locations = (0..=12)
//!     .map(|i| LocationFix {
//!         latitude: 46.0 + i as f64 * 0.0001,
//!         longitude: 7.0,
//!         altitude: 500.0 + i as f64,
//!         horizontal_accuracy: 5.0,
//!         vertical_accuracy: 3.0,
//!         timestamp: i as f64 * 10.0,
//!     })
//!     .collect();
//! raw.heart_rates.push(QuantitySample::new(2.4, 0.0, 1.0));
//!
//! let analysis = WorkoutAnalysis::new(&raw);
//! let time = analysis.time_domain();
//! assert_eq!(time.count(), 120);
//!
//! let whole = time.segment(time.indices());
//! println!("{:.0} m in {:.0} s", whole.distance().unwrap(), whole.duration());
//!
//! let by_distance = analysis.distance_domain().unwrap();
//! assert_eq!(by_distance.key(), DomainKey::Distance);
//! ```

use log::{debug, warn};

pub mod error;
pub use error::AnalysisError;

pub mod geo_utils;

pub mod series;
pub use series::{Interpolate, ScalarSeries};

pub mod coordinate;
pub use coordinate::CoordinateSeries;

pub mod raw;
pub use raw::{LocationFix, QuantitySample, RawWorkoutData};

pub mod keyed;
pub use keyed::{DomainKey, KeyedWorkoutData, SeriesId};

pub mod stats;
pub use stats::{PointStatistics, SegmentStatistics};

pub mod graph;
pub use graph::{
    EdgeInsets, GraphConfig, GraphGuide, GraphGuides, PixelPoint, Size,
    DEFAULT_SMOOTHING_COEFFICIENT,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("WorkoutSeriesRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use workout_series::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of part of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

// ============================================================================
// Workout Analysis
// ============================================================================

/// Longest workout accepted by [`WorkoutAnalysis::try_new`], in seconds (30 days).
pub const MAX_WORKOUT_DURATION: f64 = 30.0 * 24.0 * 60.0 * 60.0;

/// The keyed bundles of one workout: always one over time, and one over
/// distance if the workout recorded a usable GPS track.
#[derive(Debug)]
pub struct WorkoutAnalysis {
    time_domain: KeyedWorkoutData,
    distance_domain: Option<KeyedWorkoutData>,
}

/// Whole-workout totals, as shown in a workout list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct WorkoutSummary {
    /// Seconds between the first and last sample
    pub duration: f64,
    /// Samples in the time domain
    pub sample_count: u64,
    /// Meters
    pub distance: Option<f64>,
    /// Meters climbed
    pub climbing: Option<f64>,
    /// Meters descended, as a negative number
    pub descending: Option<f64>,
    /// Meters per second
    pub average_speed: Option<f64>,
    /// Beats per second
    pub average_heart_rate: Option<f64>,
    /// Watts
    pub average_running_power: Option<f64>,
    /// Watts
    pub average_cycling_power: Option<f64>,
    pub bounds: Option<Bounds>,
    /// Center of `bounds`, for centering a map
    pub center: Option<GpsPoint>,
}

impl WorkoutAnalysis {
    /// Analyze a workout.
    ///
    /// # Panics
    ///
    /// Panics if the workout interval does not span part of a second; see
    /// [`try_new`](Self::try_new).
    pub fn new(raw: &RawWorkoutData) -> Self {
        let time_domain = KeyedWorkoutData::time_keyed(raw);
        let distance_domain = KeyedWorkoutData::rekey(&time_domain, DomainKey::Distance);
        if distance_domain.is_none() {
            debug!("[WorkoutAnalysis] No distance domain: workout has no usable GPS track");
        }

        Self {
            time_domain,
            distance_domain,
        }
    }

    /// Analyze a workout, rejecting intervals that cannot form a time domain.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidWorkoutInterval`] if either end is not
    /// finite, if the end is not after the start, or if the workout lasts
    /// longer than [`MAX_WORKOUT_DURATION`].
    pub fn try_new(raw: &RawWorkoutData) -> Result<Self, AnalysisError> {
        let finite = raw.start_time.is_finite() && raw.end_time.is_finite();
        let duration = raw.duration();
        if !finite || series::domain_length(duration) == 0 || duration > MAX_WORKOUT_DURATION {
            return Err(AnalysisError::InvalidWorkoutInterval {
                start: raw.start_time,
                end: raw.end_time,
            });
        }
        Ok(Self::new(raw))
    }

    /// The bundle indexed by whole seconds since the start.
    pub fn time_domain(&self) -> &KeyedWorkoutData {
        &self.time_domain
    }

    /// The bundle indexed by whole meters traveled, if there is a GPS track.
    pub fn distance_domain(&self) -> Option<&KeyedWorkoutData> {
        self.distance_domain.as_ref()
    }

    /// The bundle keyed by `key`.
    pub fn domain(&self, key: DomainKey) -> Option<&KeyedWorkoutData> {
        match key {
            DomainKey::Time => Some(&self.time_domain),
            DomainKey::Distance => self.distance_domain.as_ref(),
        }
    }

    /// Totals over the whole workout, measured in the time domain.
    pub fn summary(&self) -> WorkoutSummary {
        let time = &self.time_domain;
        let whole = time.segment(time.indices());

        let bounds = whole.bounds();
        WorkoutSummary {
            duration: whole.duration(),
            sample_count: time.count() as u64,
            distance: whole.distance(),
            climbing: whole.climbing(),
            descending: whole.descending(),
            average_speed: whole.average_speed(),
            average_heart_rate: whole.average(SeriesId::HeartRate),
            average_running_power: whole.average(SeriesId::RunningPower),
            average_cycling_power: whole.average(SeriesId::CyclingPower),
            bounds,
            center: bounds.map(|b| b.center()),
        }
    }
}

/// Analyze a batch of workouts one after another.
///
/// Workouts with an invalid interval are logged and yield their error.
pub fn analyze_workouts(workouts: &[RawWorkoutData]) -> Vec<Result<WorkoutAnalysis, AnalysisError>> {
    workouts.iter().map(analyze_logged).collect()
}

/// Analyze a batch of workouts using parallel processing.
///
/// This is the same as [`analyze_workouts`] but spreads the workouts over
/// the rayon thread pool. Each workout is still analyzed on a single thread.
#[cfg(feature = "parallel")]
pub fn analyze_workouts_parallel(workouts: &[RawWorkoutData]) -> Vec<Result<WorkoutAnalysis, AnalysisError>> {
    use rayon::prelude::*;

    workouts.par_iter().map(analyze_logged).collect()
}

fn analyze_logged(raw: &RawWorkoutData) -> Result<WorkoutAnalysis, AnalysisError> {
    WorkoutAnalysis::try_new(raw).inspect_err(|e| warn!("[WorkoutAnalysis] Skipping workout: {}", e))
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Summarize a workout for display, `None` if its interval is invalid.
    #[uniffi::export]
    pub fn analyze_workout_summary(raw: RawWorkoutData) -> Option<WorkoutSummary> {
        init_logging();
        info!(
            "[WorkoutSeriesRust] analyze_workout_summary called with {} fixes, {} heart rate samples",
            raw.locations.len(),
            raw.heart_rates.len()
        );

        let start = std::time::Instant::now();
        let summary = WorkoutAnalysis::try_new(&raw).ok()?.summary();
        info!(
            "[WorkoutSeriesRust] Summarized {} samples in {:?}",
            summary.sample_count,
            start.elapsed()
        );
        Some(summary)
    }

    /// Summarize many workouts, in parallel when available.
    #[uniffi::export]
    pub fn analyze_workout_summaries(workouts: Vec<RawWorkoutData>) -> Vec<Option<WorkoutSummary>> {
        init_logging();
        info!("[WorkoutSeriesRust] analyze_workout_summaries called with {} workouts", workouts.len());

        #[cfg(feature = "parallel")]
        let analyses = analyze_workouts_parallel(&workouts);
        #[cfg(not(feature = "parallel"))]
        let analyses = analyze_workouts(&workouts);

        analyses
            .into_iter()
            .map(|analysis| analysis.ok().map(|a| a.summary()))
            .collect()
    }

    /// Resample `(keys, values)` onto `domain_magnitude` positions.
    ///
    /// Returns an empty list for an empty or mismatched sample set instead of
    /// panicking across the FFI boundary.
    #[uniffi::export]
    pub fn resample_series(values: Vec<f64>, keys: Vec<f64>, domain_magnitude: u32) -> Vec<f64> {
        init_logging();
        if values.is_empty() || values.len() != keys.len() {
            warn!(
                "[WorkoutSeriesRust] resample_series: {} values for {} keys",
                values.len(),
                keys.len()
            );
            return Vec::new();
        }

        let mut samples: Vec<(f64, f64)> = keys.into_iter().zip(values).collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (keys, values): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();

        ScalarSeries::interpolated(&values, &keys, domain_magnitude as usize)
            .as_slice()
            .to_vec()
    }
}

// ============================================================================
// Tests
// ============================================================================
