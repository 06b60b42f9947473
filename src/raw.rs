//! Raw workout records as delivered by the data-acquisition layer.
//!
//! All instants are `f64` seconds since a shared reference date. Nothing here
//! is resampled yet; see [`KeyedWorkoutData::time_keyed`](crate::KeyedWorkoutData::time_keyed).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::GpsPoint;

/// A single location fix from the GPS receiver.
///
/// Negative accuracies mark the corresponding measurement as invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level
    pub altitude: f64,
    /// Meters; negative if the coordinate is invalid
    pub horizontal_accuracy: f64,
    /// Meters; negative if the altitude is invalid
    pub vertical_accuracy: f64,
    /// Seconds since the reference date
    pub timestamp: f64,
}

impl LocationFix {
    pub fn coordinate(&self) -> GpsPoint {
        GpsPoint::new(self.latitude, self.longitude)
    }

    /// Whether the coordinate of this fix can be used.
    pub fn has_valid_coordinate(&self) -> bool {
        self.horizontal_accuracy >= 0.0 && self.coordinate().is_valid()
    }

    /// Whether the altitude of this fix can be used.
    pub fn has_valid_altitude(&self) -> bool {
        self.vertical_accuracy >= 0.0 && self.altitude.is_finite()
    }
}

/// A discrete sensor reading covering `[start_time, end_time]`.
///
/// Heart rate is in beats per second, power in watts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct QuantitySample {
    pub value: f64,
    pub start_time: f64,
    pub end_time: f64,
}

impl QuantitySample {
    pub fn new(value: f64, start_time: f64, end_time: f64) -> Self {
        Self { value, start_time, end_time }
    }
}

/// Everything recorded for one workout.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RawWorkoutData {
    /// Seconds since the reference date
    pub start_time: f64,
    /// Seconds since the reference date
    pub end_time: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub locations: Vec<LocationFix>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heart_rates: Vec<QuantitySample>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub running_power: Vec<QuantitySample>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cycling_power: Vec<QuantitySample>,
}

impl RawWorkoutData {
    /// A workout without any samples.
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self { start_time, end_time, ..Default::default() }
    }

    /// Length of the workout in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Encode as JSON for archiving.
    #[cfg(feature = "archive")]
    pub fn to_json(&self) -> Result<String, crate::AnalysisError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an archive produced by [`to_json`](Self::to_json).
    #[cfg(feature = "archive")]
    pub fn from_json(json: &str) -> Result<Self, crate::AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }
}
