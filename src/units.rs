//! Meter/degree conversion on a spherical earth approximation.
//!
//! A degree of latitude is treated as a constant [`METERS_PER_DEGREE`]; a
//! degree of longitude shrinks with the cosine of the latitude. This is not
//! geodesically exact, but the lattice generator and the in-memory oracle both
//! measure with it, so distances they exchange stay consistent.

/// Mean length of one degree of latitude, in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Latitudes are clamped to `[-MAX_LATITUDE, MAX_LATITUDE]` before the cosine
/// is taken, so longitude conversion never divides by zero.
pub const MAX_LATITUDE: f64 = 89.99;

/// Converts a north-south distance in meters to degrees of latitude.
#[inline]
pub fn meters_to_degrees_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Converts an east-west distance in meters to degrees of longitude at `lat`.
#[inline]
pub fn meters_to_degrees_lng(meters: f64, lat: f64) -> f64 {
    meters / meters_per_degree_lng(lat)
}

/// Length of one degree of longitude at `lat`, in meters.
#[inline]
pub fn meters_per_degree_lng(lat: f64) -> f64 {
    METERS_PER_DEGREE * clamp_latitude(lat).to_radians().cos()
}

/// Distance in meters between two lon/lat points.
///
/// Local equirectangular projection around the mean latitude of the two
/// points. Accurate for the separations the packer compares (a few hundred
/// kilometres at most); not meant for antipodal distances.
pub fn ground_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let mean_lat = (a.1 + b.1) / 2.0;
    let dx = (b.0 - a.0) * meters_per_degree_lng(mean_lat);
    let dy = (b.1 - a.1) * METERS_PER_DEGREE;
    dx.hypot(dy)
}

#[inline]
fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}
