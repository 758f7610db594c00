//! Scan event domain model.
//!
//! A scan event records one resolution of a tag's code. It is written
//! exactly once by the synchronous scan path (with `location = None`)
//! and patched at most once afterwards by the asynchronous enrichment
//! path. It is never deleted by normal operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Best-effort device descriptor derived from request metadata.
///
/// Every field is always a defined string; anything unclassifiable is
/// the `"Unknown"` sentinel rather than an absent value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    pub browser: String,
    pub os: String,
    pub device_class: String,
}

/// Reason a location could not be resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GeoFailure {
    Denied,
    Unavailable,
    TimedOut,
    Unsupported,
}

impl std::fmt::Display for GeoFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoFailure::Denied => write!(f, "denied"),
            GeoFailure::Unavailable => write!(f, "unavailable"),
            GeoFailure::TimedOut => write!(f, "timed_out"),
            GeoFailure::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Enrichment outcome stored on a scan event.
///
/// Serialized as either resolved coordinates or a structured failure
/// descriptor; both are terminal states for the single location patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScanLocation {
    Resolved {
        lat: f64,
        lng: f64,
        /// Reported accuracy radius in meters.
        accuracy: f64,
        timestamp: DateTime<Utc>,
    },
    Failed {
        address: String,
        error: GeoFailure,
    },
}

impl ScanLocation {
    /// Failure descriptor in the canonical `{address, error}` shape.
    pub fn failed(error: GeoFailure) -> Self {
        ScanLocation::Failed {
            address: "unknown".into(),
            error,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ScanLocation::Resolved { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub id: Uuid,
    pub tag_id: Uuid,
    /// Scans of unlinked tags still record; no pet yet.
    pub pet_id: Option<Uuid>,
    /// Anonymous scans are permitted.
    pub user_id: Option<Uuid>,
    pub device_info: DeviceInfo,
    /// `None` until the enrichment patch lands (if it ever does).
    pub location: Option<ScanLocation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScanEvent {
    pub tag_id: Uuid,
    pub pet_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub device_info: DeviceInfo,
}
