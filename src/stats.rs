//! Typed views over one index or one range of a [`KeyedWorkoutData`].
//!
//! Averages of a rate are only meaningful in the domain the rate was taken
//! with respect to: the average of speed over a range of the time domain is
//! the average speed, while the same average in the distance domain is
//! weighted by meters instead of seconds. Use
//! [`KeyedWorkoutData::segment_converting`] to take such averages in the time
//! domain for a selection made in the distance domain.

use std::ops::Range;

use geo::LineString;

use crate::{Bounds, GpsPoint, KeyedWorkoutData, SeriesId};

/// Every series value at a single index.
#[derive(Debug, Clone, Copy)]
pub struct PointStatistics<'a> {
    data: &'a KeyedWorkoutData,
    index: usize,
}

impl<'a> PointStatistics<'a> {
    pub(crate) fn new(data: &'a KeyedWorkoutData, index: usize) -> Self {
        Self { data, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The value of series `id` at this index, `None` if it was not recorded.
    pub fn value(&self, id: SeriesId) -> Option<f64> {
        self.data.series(id).map(|series| series[self.index])
    }

    /// Seconds since the reference date.
    pub fn time(&self) -> f64 {
        self.data.time()[self.index]
    }

    pub fn distance(&self) -> Option<f64> {
        self.value(SeriesId::Distance)
    }

    pub fn altitude(&self) -> Option<f64> {
        self.value(SeriesId::Altitude)
    }

    pub fn coordinate(&self) -> Option<GpsPoint> {
        self.data.coordinate().map(|series| series[self.index])
    }

    pub fn speed(&self) -> Option<f64> {
        self.value(SeriesId::Speed)
    }

    pub fn grade(&self) -> Option<f64> {
        self.value(SeriesId::Grade)
    }

    pub fn ascending(&self) -> Option<f64> {
        self.value(SeriesId::Ascending)
    }

    pub fn descending(&self) -> Option<f64> {
        self.value(SeriesId::Descending)
    }

    pub fn heart_rate(&self) -> Option<f64> {
        self.value(SeriesId::HeartRate)
    }

    pub fn running_power(&self) -> Option<f64> {
        self.value(SeriesId::RunningPower)
    }

    pub fn cycling_power(&self) -> Option<f64> {
        self.value(SeriesId::CyclingPower)
    }
}

/// Aggregates over a range of indices.
#[derive(Debug, Clone)]
pub struct SegmentStatistics<'a> {
    data: &'a KeyedWorkoutData,
    range: Range<usize>,
}

impl<'a> SegmentStatistics<'a> {
    pub(crate) fn new(data: &'a KeyedWorkoutData, range: Range<usize>) -> Self {
        Self { data, range }
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Mean of series `id`, `None` if it was not recorded or the range is empty.
    pub fn average(&self, id: SeriesId) -> Option<f64> {
        self.data.series(id)?.average(self.range.clone())
    }

    pub fn minimum(&self, id: SeriesId) -> Option<f64> {
        self.data.series(id)?.minimum(self.range.clone())
    }

    pub fn maximum(&self, id: SeriesId) -> Option<f64> {
        self.data.series(id)?.maximum(self.range.clone())
    }

    /// Change of series `id` from the first to the last index of the range.
    pub fn delta(&self, id: SeriesId) -> Option<f64> {
        Some(self.data.series(id)?.delta(self.range.clone()))
    }

    /// Start and end of the range in seconds since the reference date.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let times = self.data.time().slice(self.range.clone());
        Some((*times.first()?, *times.last()?))
    }

    /// Seconds between the first and last index.
    pub fn duration(&self) -> f64 {
        self.data.time().delta(self.range.clone())
    }

    /// Meters traveled.
    pub fn distance(&self) -> Option<f64> {
        self.delta(SeriesId::Distance)
    }

    /// Meters climbed.
    pub fn climbing(&self) -> Option<f64> {
        self.delta(SeriesId::Ascending)
    }

    /// Meters descended, as a negative number.
    pub fn descending(&self) -> Option<f64> {
        self.delta(SeriesId::Descending)
    }

    /// Net altitude change per meter traveled; `None` without movement.
    pub fn average_grade(&self) -> Option<f64> {
        let distance = self.distance()?;
        if distance == 0.0 {
            return None;
        }
        Some(self.delta(SeriesId::Altitude)? / distance)
    }

    /// Meters per second; `None` for an instantaneous range.
    pub fn average_speed(&self) -> Option<f64> {
        let duration = self.duration();
        if duration == 0.0 {
            return None;
        }
        Some(self.distance()? / duration)
    }

    /// The route covered, for drawing on a map.
    pub fn route(&self) -> Option<LineString<f64>> {
        Some(self.data.coordinate()?.route(self.range.clone()))
    }

    /// Bounding box of the route covered.
    pub fn bounds(&self) -> Option<Bounds> {
        self.data.coordinate()?.bounds(self.range.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomainKey, LocationFix, QuantitySample, RawWorkoutData};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// 60 seconds north along a meridian with a steady climb and a
    /// heart rate that rises from 2 to 3 beats per second.
    fn climb_workout() -> RawWorkoutData {
        let mut raw = RawWorkoutData::new(0.0, 60.0);
        raw.locations = (0..=6)
            .map(|i| LocationFix {
                latitude: 46.0 + i as f64 * 0.0005,
                longitude: 7.0,
                altitude: 1200.0 + i as f64 * 3.0,
                horizontal_accuracy: 4.0,
                vertical_accuracy: 2.0,
                timestamp: i as f64 * 10.0,
            })
            .collect();
        raw.heart_rates = vec![
            QuantitySample::new(2.0, 0.0, 0.0),
            QuantitySample::new(3.0, 60.0, 60.0),
        ];
        raw
    }

    #[test]
    fn test_point_statistics() {
        let data = KeyedWorkoutData::time_keyed(&climb_workout());
        let point = data.point(30);

        assert_eq!(point.index(), 30);
        assert_eq!(point.time(), 30.0);
        assert!(approx_eq(point.altitude().unwrap(), 1209.0, 1e-9));
        assert!(approx_eq(point.heart_rate().unwrap(), 2.5, 1e-9));
        assert!(approx_eq(point.coordinate().unwrap().latitude, 46.0015, 1e-9));
        assert!(point.running_power().is_none());
        assert_eq!(point.value(SeriesId::Grade), point.grade());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_point_out_of_bounds() {
        let data = KeyedWorkoutData::time_keyed(&climb_workout());
        data.point(60);
    }

    #[test]
    fn test_segment_statistics() {
        let data = KeyedWorkoutData::time_keyed(&climb_workout());
        let segment = data.segment(10..41);

        assert_eq!(segment.duration(), 30.0);
        assert_eq!(segment.time_span(), Some((10.0, 40.0)));
        assert!(approx_eq(segment.climbing().unwrap(), 9.0, 1e-9));
        assert!(approx_eq(segment.descending().unwrap(), 0.0, 1e-12));

        // 0.0015 degrees of latitude is roughly 167 m
        let distance = segment.distance().unwrap();
        assert!(approx_eq(distance, 166.8, 1.0));
        assert!(approx_eq(segment.average_speed().unwrap(), distance / 30.0, 1e-9));
        assert!(approx_eq(segment.average_grade().unwrap(), 9.0 / distance, 1e-9));
        // linear from 2 at 0 s to 3 at 60 s, centered on 25 s
        assert!(approx_eq(segment.average(SeriesId::HeartRate).unwrap(), 2.0 + 25.0 / 60.0, 1e-9));
        assert!(approx_eq(segment.minimum(SeriesId::Altitude).unwrap(), 1203.0, 1e-9));
        assert!(approx_eq(segment.maximum(SeriesId::Altitude).unwrap(), 1212.0, 1e-9));

        let bounds = segment.bounds().unwrap();
        assert!(approx_eq(bounds.min_lat, 46.0005, 1e-9));
        assert!(approx_eq(bounds.max_lat, 46.002, 1e-9));
        assert_eq!(segment.route().unwrap().0.len(), 31);
    }

    #[test]
    fn test_empty_segment() {
        let data = KeyedWorkoutData::time_keyed(&climb_workout());
        let segment = data.segment(5..5);

        assert!(segment.is_empty());
        assert_eq!(segment.duration(), 0.0);
        assert_eq!(segment.time_span(), None);
        assert_eq!(segment.average(SeriesId::Altitude), None);
        assert_eq!(segment.average_speed(), None);
        assert_eq!(segment.average_grade(), None);
        assert_eq!(segment.bounds(), None);
    }

    #[test]
    fn test_segment_converting_into_time_domain() {
        let time_domain = KeyedWorkoutData::time_keyed(&climb_workout());
        let distance_domain = KeyedWorkoutData::rekey(&time_domain, DomainKey::Distance).unwrap();

        let selection = 0..distance_domain.count();
        let by_time = time_domain.segment_converting(selection, &distance_domain);
        assert_eq!(by_time.range(), 0..60);
        assert!(approx_eq(by_time.average(SeriesId::HeartRate).unwrap(), time_domain.heart_rate().unwrap().average(..).unwrap(), 1e-9));
    }
}
