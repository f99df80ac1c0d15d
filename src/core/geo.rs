use crate::models::Coordinate;

/// Earth's radius in miles
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance between two coordinates in miles, via the Haversine
/// formula, rounded to 1 decimal place.
///
/// Symmetric, and zero for identical points.
#[inline]
pub fn distance_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_miles(EARTH_RADIUS_MILES * c)
}

/// Round a distance to the 1-decimal precision used everywhere it is exposed.
#[inline]
pub fn round_miles(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}
