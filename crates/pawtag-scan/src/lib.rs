//! PawTag Scan — Tag lifecycle state machine and scan-telemetry
//! pipeline.
//!
//! The crate is generic over the `pawtag-core` repository traits and
//! carries no storage dependency of its own:
//! - [`device`] — pure device fingerprinting from request metadata
//! - [`geo`] — timeout-bounded geolocation resolution
//! - [`recorder`] — write-now, enrich-later scan event recording
//! - [`lifecycle`] — claim / link / release state machine
//! - [`resolver`] — code-to-view orchestration for scan handlers

pub mod config;
pub mod device;
pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod recorder;
pub mod resolver;

pub use config::ScanConfig;
pub use error::LifecycleError;
pub use geo::{GeoProvider, GeoResolver, LocationResult, UnsupportedGeo};
pub use lifecycle::TagLifecycle;
pub use recorder::{RecordScan, ScanRecorder};
pub use resolver::{TagResolver, TagView};
