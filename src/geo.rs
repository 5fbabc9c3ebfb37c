//! Great-circle geometry on a spherical Earth.
//!
//! Haversine distance with a mean radius of 6371 km. All trigonometry is in
//! radians; degrees are converted with `deg * PI / 180`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use thiserror::Error;

const DEG: f64 = PI / 180.0;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid latitude {0}: must be a finite value in -90..90")]
    InvalidLatitude(f64),
    #[error("Invalid longitude {0}: must be a finite value in -180..180")]
    InvalidLongitude(f64),
}

/// A validated point in decimal degrees.
///
/// Deserialization goes through [`Coordinate::new`], so a `Coordinate` read
/// from JSON is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(self, other)
    }

    /// The point reached by travelling `distance_km` along the great circle
    /// that leaves `self` at `bearing_deg` (clockwise from north).
    pub fn destination(&self, bearing_deg: f64, distance_km: f64) -> Coordinate {
        let delta = distance_km / EARTH_RADIUS_KM;
        let theta = bearing_deg * DEG;
        let phi1 = self.lat * DEG;
        let lambda1 = self.lon * DEG;

        let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
        let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

        // Normalize longitude back into -180..180.
        let lon = ((lambda2 / DEG + 540.0) % 360.0) - 180.0;
        Coordinate {
            lat: (phi2 / DEG).clamp(-90.0, 90.0),
            lon: lon.clamp(-180.0, 180.0),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coords(self.lat, self.lon))
    }
}

/// Haversine distance between two coordinates in kilometers.
pub fn distance_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat) * DEG;
    let d_lon = (b.lon - a.lon) * DEG;

    let h = (d_lat / 2.0).sin().powi(2)
        + (a.lat * DEG).cos() * (b.lat * DEG).cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Format coordinates as "17.7231°N, 83.3077°E".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}
