//! Scan event recording: write now, enrich later.
//!
//! [`ScanRecorder::record`] persists the scan event synchronously with
//! fingerprinted device info and a null location, then spawns a
//! detached enrichment task that resolves the location and patches the
//! same row exactly once. The primary record never waits on
//! geolocation; enrichment failures are logged and swallowed.

use pawtag_core::error::{PawtagError, PawtagResult};
use pawtag_core::models::scan_event::{CreateScanEvent, ScanEvent, ScanLocation};
use pawtag_core::repository::ScanEventRepository;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::device::{self, ClientContext};
use crate::geo::{GeoProvider, GeoResolver};

/// Input for recording one scan.
#[derive(Debug, Clone)]
pub struct RecordScan {
    pub tag_id: Uuid,
    /// Scans of unlinked tags still record.
    pub pet_id: Option<Uuid>,
    /// Anonymous scans are permitted.
    pub user_id: Option<Uuid>,
    pub client: ClientContext,
}

/// Records scan events with asynchronous location enrichment.
#[derive(Clone)]
pub struct ScanRecorder<S, P> {
    scans: S,
    geo: GeoResolver<P>,
}

impl<S, P> ScanRecorder<S, P>
where
    S: ScanEventRepository + Clone + Send + Sync + 'static,
    P: GeoProvider + Clone + 'static,
{
    pub fn new(scans: S, geo: GeoResolver<P>) -> Self {
        Self { scans, geo }
    }

    /// Persists a scan event and kicks off location enrichment.
    ///
    /// The returned event always has `location = None`; the enrichment
    /// patch lands at some later point (or never, for a row that keeps
    /// a failure descriptor instead). Callers must not assume the
    /// location is present after this returns.
    ///
    /// The initial write is the only fallible part surfaced here; it
    /// fails as [`PawtagError::ScanPersistence`].
    pub async fn record(&self, input: RecordScan) -> PawtagResult<ScanEvent> {
        let device_info = device::describe(&input.client);

        let event = self
            .scans
            .create(CreateScanEvent {
                tag_id: input.tag_id,
                pet_id: input.pet_id,
                user_id: input.user_id,
                device_info,
            })
            .await
            .map_err(|e| PawtagError::ScanPersistence(e.to_string()))?;

        debug!(event_id = %event.id, tag_id = %event.tag_id, "scan event recorded");

        self.spawn_enrichment(event.id);

        Ok(event)
    }

    /// Fire-and-forget: resolves a location (any variant, including
    /// failures) and patches the event row once. Never retried, never
    /// surfaced to the caller.
    fn spawn_enrichment(&self, event_id: Uuid) {
        let scans = self.scans.clone();
        let geo = self.geo.clone();

        tokio::spawn(async move {
            let result = geo.resolve().await;
            let location = ScanLocation::from(result);

            match scans.patch_location(event_id, location).await {
                Ok(true) => {
                    debug!(event_id = %event_id, "scan event location enriched");
                }
                Ok(false) => {
                    warn!(event_id = %event_id, "scan event already enriched or missing");
                }
                Err(e) => {
                    warn!(event_id = %event_id, error = %e, "location enrichment failed");
                }
            }
        });
    }
}
