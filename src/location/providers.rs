//! Location providers: manual input, IP geolocation, and a max-age cache.
//!
//! Every provider answers a single `request_location` call with either a
//! validated sample or a [`LocationFailure`]. Timeouts are enforced here,
//! never by the resolver.

use super::cache::LocationCache;
use super::types::{LocationFailure, LocationOptions, LocationSample, LocationSource};
use crate::geo::Coordinate;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_location(
        &self,
        opts: &LocationOptions,
    ) -> Result<LocationSample, LocationFailure>;
}

// ─── Manual ─────────────────────────────────────────────────────

/// A coordinate typed in by the user.
pub struct ManualProvider {
    coordinate: Coordinate,
}

impl ManualProvider {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for ManualProvider {
    async fn request_location(
        &self,
        _opts: &LocationOptions,
    ) -> Result<LocationSample, LocationFailure> {
        Ok(LocationSample::new(self.coordinate, LocationSource::Manual))
    }
}

// ─── Unsupported ────────────────────────────────────────────────

/// No location capability at all.
pub struct UnsupportedProvider;

#[async_trait]
impl LocationProvider for UnsupportedProvider {
    async fn request_location(
        &self,
        _opts: &LocationOptions,
    ) -> Result<LocationSample, LocationFailure> {
        Err(LocationFailure::Unsupported)
    }
}

// ─── IP-based geolocation ───────────────────────────────────────

const IP_API_URL: &str = "https://ipapi.co/json/";
const USER_AGENT: &str = "GohubsLocator/0.3";

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Approximate location from the public IP address.
pub struct IpLocationProvider {
    url: String,
    offline: bool,
}

impl IpLocationProvider {
    pub fn new() -> Self {
        Self { url: IP_API_URL.to_string(), offline: false }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into(), offline: false }
    }

    /// Offline mode: fail without touching the network.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl Default for IpLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn ip_geolocate(url: &str, timeout: Duration) -> Result<Coordinate, LocationFailure> {
    // The request timeout is a backstop; the caller's deadline fires first.
    let agent = ureq::AgentBuilder::new()
        .timeout(timeout + Duration::from_secs(1))
        .build();

    let response = agent
        .get(url)
        .set("User-Agent", USER_AGENT)
        .call()
        .map_err(|e| {
            tracing::warn!(error = %e, "IP geolocation request failed");
            LocationFailure::Unavailable
        })?;

    let r: IpApiResult = response.into_json().map_err(|e| {
        tracing::warn!(error = %e, "invalid IP geolocation response");
        LocationFailure::Unavailable
    })?;

    let (lat, lon) = match (r.latitude, r.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            tracing::warn!("IP geolocation response has no coordinates");
            return Err(LocationFailure::Unavailable);
        }
    };

    Coordinate::new(lat, lon).map_err(|e| {
        tracing::warn!(error = %e, "IP geolocation returned invalid coordinates");
        LocationFailure::Unavailable
    })
}

#[async_trait]
impl LocationProvider for IpLocationProvider {
    async fn request_location(
        &self,
        opts: &LocationOptions,
    ) -> Result<LocationSample, LocationFailure> {
        if self.offline {
            return Err(LocationFailure::Unavailable);
        }

        let url = self.url.clone();
        let timeout = opts.timeout;
        let task = tokio::task::spawn_blocking(move || ip_geolocate(&url, timeout));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => {
                result.map(|coordinate| LocationSample::new(coordinate, LocationSource::IpApi))
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "IP geolocation task failed");
                Err(LocationFailure::Unavailable)
            }
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "IP geolocation timed out");
                Err(LocationFailure::Timeout)
            }
        }
    }
}

// ─── Max-age cache ──────────────────────────────────────────────

/// Reuses the last fix while it is younger than `opts.max_age`, otherwise
/// asks the inner provider and remembers a successful answer.
pub struct CachedProvider<P> {
    inner: P,
    cache: Mutex<LocationCache>,
}

impl<P: LocationProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: LocationCache) -> Self {
        Self { inner, cache: Mutex::new(cache) }
    }
}

#[async_trait]
impl<P: LocationProvider> LocationProvider for CachedProvider<P> {
    async fn request_location(
        &self,
        opts: &LocationOptions,
    ) -> Result<LocationSample, LocationFailure> {
        let cached = {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            cache.get_fresh(opts.max_age)
        };
        if let Some(sample) = cached {
            tracing::debug!(coordinate = %sample.coordinate, "using cached location");
            return Ok(sample);
        }

        let sample = self.inner.request_location(opts).await?;
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(&sample);
        Ok(sample)
    }
}
