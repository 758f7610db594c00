//! Timeout-bounded geolocation resolution.
//!
//! The platform's location capability is injected behind
//! [`GeoProvider`] so the pipeline never touches an ambient global and
//! tests can substitute arbitrary behavior. [`GeoResolver`] owns the
//! bounding: one single-shot request per resolve, dropped (abandoned)
//! once the timeout elapses.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pawtag_core::models::scan_event::{GeoFailure, ScanLocation};

use crate::config::ScanConfig;

/// Outcome of one geolocation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationResult {
    Resolved {
        lat: f64,
        lng: f64,
        /// Reported accuracy radius in meters.
        accuracy: f64,
        timestamp: DateTime<Utc>,
    },
    /// The user or platform refused the request.
    Denied,
    /// The platform has a location capability but could not produce
    /// a position.
    Unavailable,
    /// The request did not finish within the configured bound.
    TimedOut,
    /// The platform has no location capability at all.
    Unsupported,
}

impl From<LocationResult> for ScanLocation {
    fn from(result: LocationResult) -> Self {
        match result {
            LocationResult::Resolved {
                lat,
                lng,
                accuracy,
                timestamp,
            } => ScanLocation::Resolved {
                lat,
                lng,
                accuracy,
                timestamp,
            },
            LocationResult::Denied => ScanLocation::failed(GeoFailure::Denied),
            LocationResult::Unavailable => ScanLocation::failed(GeoFailure::Unavailable),
            LocationResult::TimedOut => ScanLocation::failed(GeoFailure::TimedOut),
            LocationResult::Unsupported => ScanLocation::failed(GeoFailure::Unsupported),
        }
    }
}

/// Single-shot location capability of the host platform.
///
/// Implementations should issue exactly one request per `locate` call
/// (no continuous tracking) and may take arbitrarily long; the
/// resolver enforces the deadline.
pub trait GeoProvider: Send + Sync {
    fn locate(&self, high_accuracy: bool) -> impl Future<Output = LocationResult> + Send;

    /// Whether the platform has a location capability at all. When
    /// `false`, resolution short-circuits to `Unsupported` without
    /// issuing a request.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Null provider for deployments without a location capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedGeo;

impl GeoProvider for UnsupportedGeo {
    async fn locate(&self, _high_accuracy: bool) -> LocationResult {
        LocationResult::Unsupported
    }

    fn is_supported(&self) -> bool {
        false
    }
}

/// Wraps a [`GeoProvider`] with a bounded timeout.
#[derive(Debug, Clone)]
pub struct GeoResolver<P> {
    provider: P,
    timeout: Duration,
    high_accuracy: bool,
}

impl<P: GeoProvider> GeoResolver<P> {
    pub fn new(provider: P, config: &ScanConfig) -> Self {
        Self {
            provider,
            timeout: Duration::from_millis(config.geo_timeout_ms),
            high_accuracy: config.geo_high_accuracy,
        }
    }

    /// Resolves a location within the configured bound.
    ///
    /// Never takes longer than the timeout: an overrunning provider
    /// future is dropped and the attempt reported as `TimedOut`.
    pub async fn resolve(&self) -> LocationResult {
        if !self.provider.is_supported() {
            return LocationResult::Unsupported;
        }

        match tokio::time::timeout(self.timeout, self.provider.locate(self.high_accuracy)).await {
            Ok(result) => result,
            Err(_) => LocationResult::TimedOut,
        }
    }
}
