//! # Geographic Utilities
//!
//! Geodesy used by the coordinate series: per-step distances for cumulative
//! distance tracking and great-circle interpolation for resampling a GPS track
//! onto a uniform domain.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`geocentric_radius`] | WGS84 geocentric radius at a latitude |
//! | [`step_distance`] | Locally-accurate distance between two nearby GPS points |
//! | [`haversine_distance`] | Spherical great-circle distance (6,371 km Earth) |
//! | [`great_circle_interpolate`] | Point a fraction of the way along a great circle |
//! | [`compute_bounds`] | Bounding box of a GPS track |
//!
//! ## Example
//!
//! ```rust
//! use workout_series::{GpsPoint, geo_utils};
//!
//! let start = GpsPoint::new(0.0, 0.0);
//! let end = GpsPoint::new(0.0, 1.0);
//!
//! let midpoint = geo_utils::great_circle_interpolate(&start, &end, 0.5);
//! assert!((midpoint.longitude - 0.5).abs() < 1e-9);
//!
//! let step = geo_utils::step_distance(&start, &end);
//! assert!((step - 111_319.5).abs() < 1.0);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Step distance
//!
//! [`step_distance`] is not a closed-form ellipsoidal geodesic (Vincenty). It
//! combines the haversine central angle with the mean of the WGS84 geocentric
//! radii at both endpoints. For the short steps between consecutive GPS fixes
//! this tracks the ellipsoid closely, and it is what the cumulative distance
//! series is built from.
//!
//! ### Great-circle interpolation
//!
//! [`great_circle_interpolate`] uses Clairaut's relation on an ideal sphere:
//! the azimuth `alpha_0` at the node where the great circle crosses the
//! equator is constant along the path, so a point is fully described by its
//! angular distance `sigma` from that node. Interpolating `sigma` linearly
//! moves along the great circle at constant speed.
//!
//! Reference: [Great-circle navigation (Wikipedia)](https://en.wikipedia.org/wiki/Great-circle_navigation)

use geo::{Distance, Haversine, Point};
use crate::{Bounds, GpsPoint};

/// WGS84 semi-major (equatorial) axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 semi-minor (polar) axis in meters.
pub const WGS84_SEMI_MINOR_AXIS: f64 = 6_356_752.314_245;

// =============================================================================
// Distance Functions
// =============================================================================

/// Geocentric radius of the WGS84 ellipsoid at `latitude` (degrees).
///
/// ```text
/// R(lat) = sqrt((a^4 cos^2(lat) + b^4 sin^2(lat)) / (a^2 cos^2(lat) + b^2 sin^2(lat)))
/// ```
///
/// Equals the semi-major axis at the equator and the semi-minor axis at the poles.
#[inline]
pub fn geocentric_radius(latitude: f64) -> f64 {
    let (sin, cos) = latitude.to_radians().sin_cos();
    let a2 = WGS84_SEMI_MAJOR_AXIS * WGS84_SEMI_MAJOR_AXIS;
    let b2 = WGS84_SEMI_MINOR_AXIS * WGS84_SEMI_MINOR_AXIS;

    let cos2 = cos * cos;
    let sin2 = sin * sin;

    ((a2 * a2 * cos2 + b2 * b2 * sin2) / (a2 * cos2 + b2 * sin2)).sqrt()
}

/// Distance in meters between two consecutive GPS fixes.
///
/// The haversine central angle is scaled by the average of the geocentric
/// radii at both endpoints. Identical points are exactly 0 apart and the
/// result does not depend on argument order.
///
/// # Example
///
/// ```rust
/// use workout_series::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(51.5074, -0.1278);
/// let b = GpsPoint::new(51.5080, -0.1290);
///
/// assert_eq!(geo_utils::step_distance(&a, &a), 0.0);
/// assert_eq!(geo_utils::step_distance(&a, &b), geo_utils::step_distance(&b, &a));
/// ```
pub fn step_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let radius = (geocentric_radius(p1.latitude) + geocentric_radius(p2.latitude)) / 2.0;

    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlng = (p2.longitude - p1.longitude).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlng.sin().powi(2);
    // rounding can push h just outside [0, 1]
    let h = h.clamp(0.0, 1.0);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    central_angle * radius
}

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (assuming a spherical Earth
/// with radius 6,371 km). Useful as a reference for [`step_distance`].
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

// =============================================================================
// Interpolation
// =============================================================================

/// The point a fraction `t` of the way from `start` to `end` along the great
/// circle connecting them.
///
/// `t == 0.0` and `t == 1.0` return the endpoints unchanged, without any
/// trigonometric round-off. Values of `t` outside `[0, 1]` extrapolate along
/// the same great circle.
pub fn great_circle_interpolate(start: &GpsPoint, end: &GpsPoint, t: f64) -> GpsPoint {
    if t == 0.0 || start == end {
        return *start;
    }
    if t == 1.0 {
        return *end;
    }

    let phi1 = start.latitude.to_radians();
    let phi2 = end.latitude.to_radians();
    let lambda1 = start.longitude.to_radians();
    let dlambda = (end.longitude - start.longitude).to_radians();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_phi2, cos_phi2) = phi2.sin_cos();
    let (sin_dlambda, cos_dlambda) = dlambda.sin_cos();

    // initial bearing at `start`
    let alpha1 = (sin_dlambda * cos_phi2)
        .atan2(cos_phi1 * sin_phi2 - sin_phi1 * cos_phi2 * cos_dlambda);
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    // Clairaut: azimuth at the equator crossing
    let alpha0 = (sin_alpha1 * cos_phi1)
        .atan2((cos_alpha1 * cos_alpha1 + sin_alpha1 * sin_alpha1 * sin_phi1 * sin_phi1).sqrt());
    let (sin_alpha0, cos_alpha0) = alpha0.sin_cos();

    // angular distance of each endpoint from the equator crossing
    let sigma1 = if phi1 == 0.0 && cos_alpha1.abs() < f64::EPSILON {
        0.0
    } else {
        phi1.tan().atan2(cos_alpha1)
    };
    let central_angle = {
        let y = ((cos_phi1 * sin_phi2 - sin_phi1 * cos_phi2 * cos_dlambda).powi(2)
            + (cos_phi2 * sin_dlambda).powi(2))
        .sqrt();
        let x = sin_phi1 * sin_phi2 + cos_phi1 * cos_phi2 * cos_dlambda;
        y.atan2(x)
    };
    let sigma2 = sigma1 + central_angle;

    // longitude of the equator crossing
    let lambda01 = (sin_alpha0 * sigma1.sin()).atan2(sigma1.cos());
    let lambda0 = lambda1 - lambda01;

    let sigma = sigma1 + t * (sigma2 - sigma1);
    let (sin_sigma, cos_sigma) = sigma.sin_cos();

    let phi = (cos_alpha0 * sin_sigma)
        .atan2((cos_sigma * cos_sigma + sin_alpha0 * sin_alpha0 * sin_sigma * sin_sigma).sqrt());
    let lambda = (sin_alpha0 * sin_sigma).atan2(cos_sigma) + lambda0;

    GpsPoint::new(phi.to_degrees(), normalize_longitude(lambda.to_degrees()))
}

/// Wrap a longitude in degrees into `[-180, 180)`.
#[inline]
fn normalize_longitude(longitude: f64) -> f64 {
    if (-180.0..180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a GPS track.
///
/// Returns `None` for an empty track.
///
/// # Example
///
/// ```rust
/// use workout_series::{GpsPoint, geo_utils};
///
/// let track = vec![
///     GpsPoint::new(51.5000, -0.1300),
///     GpsPoint::new(51.5100, -0.1200),
///     GpsPoint::new(51.5050, -0.1250),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&track).unwrap();
/// assert_eq!(bounds.min_lat, 51.5000);
/// assert_eq!(bounds.max_lng, -0.1200);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Some(Bounds { min_lat, max_lat, min_lng, max_lng })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_geocentric_radius_extremes() {
        assert!(approx_eq(geocentric_radius(0.0), WGS84_SEMI_MAJOR_AXIS, 1e-6));
        assert!(approx_eq(geocentric_radius(90.0), WGS84_SEMI_MINOR_AXIS, 1e-6));
        assert!(approx_eq(geocentric_radius(-90.0), WGS84_SEMI_MINOR_AXIS, 1e-6));

        let mid = geocentric_radius(45.0);
        assert!(mid < WGS84_SEMI_MAJOR_AXIS && mid > WGS84_SEMI_MINOR_AXIS);
    }

    #[test]
    fn test_step_distance_same_point() {
        let p = GpsPoint::new(51.5074, -0.1278);
        assert_eq!(step_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_step_distance_symmetric() {
        let a = GpsPoint::new(47.3769, 8.5417);
        let b = GpsPoint::new(47.3771, 8.5421);
        assert_eq!(step_distance(&a, &b), step_distance(&b, &a));
    }

    #[test]
    fn test_step_distance_equator_degree() {
        // one degree of longitude at the equator on the WGS84 equatorial radius
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 1.0);
        let expected = WGS84_SEMI_MAJOR_AXIS * 1f64.to_radians();
        assert!(approx_eq(step_distance(&a, &b), expected, 1e-6));
    }

    #[test]
    fn test_step_distance_close_to_haversine() {
        // London to Paris, the two models agree within half a percent
        let london = GpsPoint::new(51.5074, -0.1278);
        let paris = GpsPoint::new(48.8566, 2.3522);
        let ellipsoidal = step_distance(&london, &paris);
        let spherical = haversine_distance(&london, &paris);
        assert!((ellipsoidal - spherical).abs() / spherical < 0.005);
    }

    #[test]
    fn test_interpolate_endpoints_exact() {
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(48.8566, 2.3522);
        assert_eq!(great_circle_interpolate(&a, &b, 0.0), a);
        assert_eq!(great_circle_interpolate(&a, &b, 1.0), b);
        assert_eq!(great_circle_interpolate(&a, &a, 0.3), a);
    }

    #[test]
    fn test_interpolate_equator() {
        let a = GpsPoint::new(0.0, 0.0);
        let b = GpsPoint::new(0.0, 1.0);
        let mid = great_circle_interpolate(&a, &b, 0.5);
        assert!(approx_eq(mid.latitude, 0.0, 1e-9));
        assert!(approx_eq(mid.longitude, 0.5, 1e-9));
    }

    #[test]
    fn test_interpolate_meridian_southbound() {
        let a = GpsPoint::new(10.0, 20.0);
        let b = GpsPoint::new(8.0, 20.0);
        let p = great_circle_interpolate(&a, &b, 0.25);
        assert!(approx_eq(p.latitude, 9.5, 1e-9));
        assert!(approx_eq(p.longitude, 20.0, 1e-9));
    }

    #[test]
    fn test_interpolate_stays_on_great_circle() {
        // splitting a path at t reproduces the distances at either side
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(48.8566, 2.3522);
        let total = haversine_distance(&a, &b);
        let p = great_circle_interpolate(&a, &b, 0.3);
        assert!(approx_eq(haversine_distance(&a, &p), 0.3 * total, 1.0));
        assert!(approx_eq(haversine_distance(&p, &b), 0.7 * total, 1.0));
    }

    #[test]
    fn test_interpolate_across_antimeridian() {
        let a = GpsPoint::new(0.0, 179.5);
        let b = GpsPoint::new(0.0, -179.5);
        let mid = great_circle_interpolate(&a, &b, 0.5);
        assert!(approx_eq(mid.latitude, 0.0, 1e-9));
        assert!(approx_eq(mid.longitude.abs(), 180.0, 1e-9));
    }

    #[test]
    fn test_compute_bounds() {
        let track = vec![
            GpsPoint::new(51.50, -0.13),
            GpsPoint::new(51.51, -0.12),
            GpsPoint::new(51.505, -0.125),
        ];
        let bounds = compute_bounds(&track).unwrap();
        assert_eq!(bounds.min_lat, 51.50);
        assert_eq!(bounds.max_lat, 51.51);
        assert_eq!(bounds.min_lng, -0.13);
        assert_eq!(bounds.max_lng, -0.12);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }
}
