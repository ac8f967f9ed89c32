//! Pure spherical-earth math: great-circle distance, initial bearing,
//! and route length.
//!
//! All functions work on plain `(latitude, longitude)` degree pairs and
//! have no dependencies beyond `std`. Distances are in nautical miles on
//! a mean-radius sphere.
//!
//! # Coordinate System
//!
//! - Latitude: degrees north (-90 to 90)
//! - Longitude: degrees east (-180 to 180)
//! - Bearing: degrees true (0-360, 0=north, 90=east)
//! - Distance: nautical miles (1 nm = 1852 meters)

/// Earth's mean radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Floor value returned by [`route_length_nm`] for degenerate routes.
///
/// Guards downstream division when a route has fewer than two points.
const MIN_ROUTE_LENGTH_NM: f64 = 1.0;

/// Great-circle distance between two positions in nautical miles.
///
/// Uses the haversine formula, which is symmetric, zero for identical
/// points, and continuous across the antimeridian.
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_NM * c
}

/// Initial bearing from one position to another, in degrees true.
///
/// Returns the forward azimuth on the spherical earth model, normalized
/// to the range `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    let bearing = y.atan2(x).to_degrees();
    normalize_bearing(bearing)
}

/// Total length of a route in nautical miles.
///
/// Sums the great-circle distance of each consecutive waypoint pair.
/// Routes with fewer than two points return a floor of 1 nm (never 0)
/// so downstream duration math never divides by zero.
pub fn route_length_nm(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return MIN_ROUTE_LENGTH_NM;
    }

    points
        .iter()
        .zip(points.iter().skip(1))
        .map(|(&(lat1, lon1), &(lat2, lon2))| distance_nm(lat1, lon1, lat2, lon2))
        .sum()
}

/// Normalize a bearing to the range `[0, 360)` degrees.
pub fn normalize_bearing(bearing: f64) -> f64 {
    let wrapped = bearing.rem_euclid(360.0);
    // rem_euclid(360.0) can yield exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
