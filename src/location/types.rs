//! Core types for the location boundary.

use crate::geo::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Where a location sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    Manual,
    IpApi,
    Cache,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "Manual"),
            Self::IpApi => write!(f, "IP"),
            Self::Cache => write!(f, "Cache"),
        }
    }
}

/// One location fix handed to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationSample {
    pub coordinate: Coordinate,
    pub source: LocationSource,
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(coordinate: Coordinate, source: LocationSource) -> Self {
        Self { coordinate, source, captured_at: Utc::now() }
    }
}

/// Why a provider could not produce a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationFailure {
    PermissionDenied,
    Unavailable,
    Timeout,
    /// The device has no location capability at all.
    Unsupported,
}

impl fmt::Display for LocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "Location permission denied"),
            Self::Unavailable => write!(f, "Location unavailable"),
            Self::Timeout => write!(f, "Location request timed out"),
            Self::Unsupported => write!(f, "Location services not supported"),
        }
    }
}

impl std::error::Error for LocationFailure {}

/// Tuning knobs passed to a provider with each request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationOptions {
    /// Prefer an accurate fix over a fast one.
    pub high_accuracy: bool,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Oldest cached sample that may be reused.
    #[serde(with = "duration_secs")]
    pub max_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(10 * 60),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = LocationOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.max_age, Duration::from_secs(600));
    }

    #[test]
    fn test_options_partial_json() {
        let opts: LocationOptions = serde_json::from_str(r#"{"timeout": 2.5}"#).unwrap();
        assert_eq!(opts.timeout, Duration::from_millis(2500));
        assert_eq!(opts.max_age, Duration::from_secs(600));
        assert!(serde_json::from_str::<LocationOptions>(r#"{"timeout": -1}"#).is_err());
    }

    #[test]
    fn test_failure_serde_tags() {
        assert_eq!(serde_json::to_string(&LocationFailure::PermissionDenied).unwrap(), "\"permission-denied\"");
        assert_eq!(serde_json::to_string(&LocationFailure::Timeout).unwrap(), "\"timeout\"");
        assert_eq!(serde_json::to_string(&LocationFailure::Unsupported).unwrap(), "\"unsupported\"");
    }
}
