//! Integration tests for the scan recorder's write-now, enrich-later
//! contract, against in-memory SurrealDB.

use std::time::Duration;

use chrono::Utc;
use pawtag_core::error::{PawtagError, PawtagResult};
use pawtag_core::models::scan_event::{
    CreateScanEvent, GeoFailure, ScanEvent, ScanLocation,
};
use pawtag_core::repository::{PaginatedResult, Pagination, ScanEventRepository};
use pawtag_db::repository::SurrealScanEventRepository;
use pawtag_scan::device::ClientContext;
use pawtag_scan::{GeoProvider, GeoResolver, LocationResult, RecordScan, ScanConfig, ScanRecorder};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type TestRepo = SurrealScanEventRepository<surrealdb::engine::local::Db>;

/// Provider whose future never completes; enrichment can never land.
#[derive(Clone)]
struct NeverGeo;

impl GeoProvider for NeverGeo {
    async fn locate(&self, _high_accuracy: bool) -> LocationResult {
        std::future::pending().await
    }
}

/// Provider that denies after a short delay.
#[derive(Clone)]
struct SlowDenied;

impl GeoProvider for SlowDenied {
    async fn locate(&self, _high_accuracy: bool) -> LocationResult {
        tokio::time::sleep(Duration::from_millis(50)).await;
        LocationResult::Denied
    }
}

/// Provider that resolves immediately to fixed coordinates.
#[derive(Clone)]
struct FixedGeo;

impl GeoProvider for FixedGeo {
    async fn locate(&self, _high_accuracy: bool) -> LocationResult {
        LocationResult::Resolved {
            lat: 52.52,
            lng: 13.405,
            accuracy: 20.0,
            timestamp: Utc::now(),
        }
    }
}

async fn setup() -> TestRepo {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pawtag_db::run_migrations(&db).await.unwrap();
    SurrealScanEventRepository::new(db)
}

fn recorder<P: GeoProvider + Clone + 'static>(
    repo: TestRepo,
    provider: P,
) -> ScanRecorder<TestRepo, P> {
    ScanRecorder::new(repo, GeoResolver::new(provider, &ScanConfig::default()))
}

fn scan_input(tag_id: Uuid) -> RecordScan {
    RecordScan {
        tag_id,
        pet_id: Some(Uuid::new_v4()),
        user_id: None,
        client: ClientContext {
            user_agent: Some(
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) \
                 AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 \
                 Mobile/15E148 Safari/604.1"
                    .into(),
            ),
            platform: Some("iPhone".into()),
            language: Some("en-US".into()),
        },
    }
}

/// Polls until the event's location is set, within a bounded window.
async fn wait_for_location(repo: &TestRepo, id: Uuid) -> ScanEvent {
    for _ in 0..40 {
        let event = repo.get_by_id(id).await.unwrap();
        if event.location.is_some() {
            return event;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("location was not enriched within the test window");
}

#[tokio::test]
async fn record_persists_before_any_geolocation_resolves() {
    let repo = setup().await;
    let recorder = recorder(repo.clone(), NeverGeo);
    let tag_id = Uuid::new_v4();

    let event = recorder.record(scan_input(tag_id)).await.unwrap();

    // The primary record exists with device info and no location,
    // while the provider is still hanging.
    assert_eq!(event.tag_id, tag_id);
    assert!(event.location.is_none());
    assert_eq!(event.device_info.browser, "Safari");
    assert_eq!(event.device_info.os, "iOS");
    assert_eq!(event.device_info.device_class, "Mobile");
    assert_eq!(event.device_info.platform, "iPhone");

    let stored = repo.get_by_id(event.id).await.unwrap();
    assert!(stored.location.is_none());

    // Still unenriched after giving the runtime time to run the task.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let stored = repo.get_by_id(event.id).await.unwrap();
    assert!(stored.location.is_none());
}

#[tokio::test]
async fn denied_resolution_patches_the_same_row() {
    let repo = setup().await;
    let recorder = recorder(repo.clone(), SlowDenied);

    let event = recorder.record(scan_input(Uuid::new_v4())).await.unwrap();
    assert!(event.location.is_none());

    let enriched = wait_for_location(&repo, event.id).await;
    assert_eq!(enriched.id, event.id, "patched row, not a new one");
    match enriched.location {
        Some(ScanLocation::Failed { address, error }) => {
            assert_eq!(address, "unknown");
            assert_eq!(error, GeoFailure::Denied);
        }
        other => panic!("expected failure descriptor, got {other:?}"),
    }
}

#[tokio::test]
async fn resolved_location_is_patched_in() {
    let repo = setup().await;
    let recorder = recorder(repo.clone(), FixedGeo);

    let event = recorder.record(scan_input(Uuid::new_v4())).await.unwrap();
    let enriched = wait_for_location(&repo, event.id).await;

    match enriched.location {
        Some(ScanLocation::Resolved { lat, lng, accuracy, .. }) => {
            assert_eq!(lat, 52.52);
            assert_eq!(lng, 13.405);
            assert_eq!(accuracy, 20.0);
        }
        other => panic!("expected resolved coordinates, got {other:?}"),
    }
}

#[tokio::test]
async fn timed_out_resolution_is_recorded_as_such() {
    let repo = setup().await;
    let config = ScanConfig {
        geo_timeout_ms: 20,
        ..ScanConfig::default()
    };
    let recorder = ScanRecorder::new(repo.clone(), GeoResolver::new(NeverGeo, &config));

    let event = recorder.record(scan_input(Uuid::new_v4())).await.unwrap();
    let enriched = wait_for_location(&repo, event.id).await;

    assert_eq!(
        enriched.location,
        Some(ScanLocation::failed(GeoFailure::TimedOut)),
        "an abandoned request must still explain itself on the row"
    );
}

/// Repository whose initial write always fails.
#[derive(Clone)]
struct FailingScans;

impl ScanEventRepository for FailingScans {
    async fn create(&self, _input: CreateScanEvent) -> PawtagResult<ScanEvent> {
        Err(PawtagError::Database("store unreachable".into()))
    }

    async fn get_by_id(&self, id: Uuid) -> PawtagResult<ScanEvent> {
        Err(PawtagError::NotFound {
            entity: "scan_event".into(),
            id: id.to_string(),
        })
    }

    async fn patch_location(&self, _id: Uuid, _location: ScanLocation) -> PawtagResult<bool> {
        Ok(false)
    }

    async fn list_for_tag(
        &self,
        _tag_id: Uuid,
        pagination: Pagination,
    ) -> PawtagResult<PaginatedResult<ScanEvent>> {
        Ok(PaginatedResult {
            items: vec![],
            total: 0,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

#[tokio::test]
async fn failed_initial_write_surfaces_scan_persistence_error() {
    let recorder = ScanRecorder::new(
        FailingScans,
        GeoResolver::new(FixedGeo, &ScanConfig::default()),
    );

    let err = recorder.record(scan_input(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, PawtagError::ScanPersistence(_)));
}
