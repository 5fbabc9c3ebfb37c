//! File-based cache of the last location fix at ~/.gohubs/location.json.
//!
//! A sample is reused only while it is younger than the caller's max age.
//! Unreadable or corrupt files are treated as an empty cache.

use super::types::{LocationSample, LocationSource};
use crate::geo::Coordinate;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    /// Capture time, ms since the epoch.
    timestamp: i64,
    #[serde(default)]
    source_name: Option<String>,
}

/// The location cache.
pub struct LocationCache {
    path: PathBuf,
    entry: Option<CacheEntry>,
}

impl LocationCache {
    /// Load cache from the default location (~/.gohubs/location.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load cache from a specific path (for testing).
    pub fn load_from(path: PathBuf) -> Self {
        let entry = Self::read_file(&path);
        Self { path, entry }
    }

    pub fn default_path() -> PathBuf {
        crate::config::app_dir().join("location.json")
    }

    fn read_file(path: &Path) -> Option<CacheEntry> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// The cached sample if it is no older than `max_age`.
    pub fn get_fresh(&self, max_age: Duration) -> Option<LocationSample> {
        let entry = self.entry.as_ref()?;

        let now = Utc::now().timestamp_millis();
        let age_ms = now - entry.timestamp;
        if age_ms < 0 || age_ms as u128 > max_age.as_millis() {
            return None;
        }

        // A hand-edited file may hold anything.
        let coordinate = Coordinate::new(entry.lat, entry.lon).ok()?;
        let captured_at = Utc.timestamp_millis_opt(entry.timestamp).single()?;
        Some(LocationSample {
            coordinate,
            source: LocationSource::Cache,
            captured_at,
        })
    }

    /// Store a sample and persist it to disk.
    pub fn put(&mut self, sample: &LocationSample) {
        self.entry = Some(CacheEntry {
            lat: sample.coordinate.lat(),
            lon: sample.coordinate.lon(),
            timestamp: sample.captured_at.timestamp_millis(),
            source_name: Some(sample.source.to_string()),
        });
        self.save();
    }

    fn save(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Some(entry) = &self.entry {
            match serde_json::to_string_pretty(entry) {
                Ok(json) => {
                    if let Err(e) = fs::write(&self.path, json) {
                        tracing::warn!(path = %self.path.display(), error = %e, "cannot write location cache");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "cannot serialize location cache"),
            }
        }
    }
}
