//! SurrealDB implementation of [`ScanEventRepository`].
//!
//! Scan events are append/patch-own-row only: `create` writes the row
//! with a null location, `patch_location` fills it in at most once via
//! a `WHERE location = NONE` guard. No cross-row locking is needed.

use chrono::{DateTime, Utc};
use pawtag_core::error::PawtagResult;
use pawtag_core::models::scan_event::{CreateScanEvent, DeviceInfo, ScanEvent, ScanLocation};
use pawtag_core::repository::{PaginatedResult, Pagination, ScanEventRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ScanEventRow {
    tag_id: String,
    pet_id: Option<String>,
    user_id: Option<String>,
    device_info: serde_json::Value,
    location: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ScanEventRowWithId {
    record_id: String,
    tag_id: String,
    pet_id: Option<String>,
    user_id: Option<String>,
    device_info: serde_json::Value,
    location: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(value: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|s| parse_uuid(&s, field)).transpose()
}

fn decode_device_info(value: serde_json::Value) -> Result<DeviceInfo, DbError> {
    serde_json::from_value(value).map_err(|e| DbError::Decode(format!("invalid device_info: {e}")))
}

fn decode_location(value: Option<serde_json::Value>) -> Result<Option<ScanLocation>, DbError> {
    value
        .map(|v| {
            serde_json::from_value(v).map_err(|e| DbError::Decode(format!("invalid location: {e}")))
        })
        .transpose()
}

impl ScanEventRow {
    fn into_event(self, id: Uuid) -> Result<ScanEvent, DbError> {
        Ok(ScanEvent {
            id,
            tag_id: parse_uuid(&self.tag_id, "tag")?,
            pet_id: parse_opt_uuid(self.pet_id, "pet")?,
            user_id: parse_opt_uuid(self.user_id, "user")?,
            device_info: decode_device_info(self.device_info)?,
            location: decode_location(self.location)?,
            created_at: self.created_at,
        })
    }
}

impl ScanEventRowWithId {
    fn try_into_event(self) -> Result<ScanEvent, DbError> {
        let id = parse_uuid(&self.record_id, "scan event")?;
        Ok(ScanEvent {
            id,
            tag_id: parse_uuid(&self.tag_id, "tag")?,
            pet_id: parse_opt_uuid(self.pet_id, "pet")?,
            user_id: parse_opt_uuid(self.user_id, "user")?,
            device_info: decode_device_info(self.device_info)?,
            location: decode_location(self.location)?,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the ScanEvent repository.
#[derive(Clone)]
pub struct SurrealScanEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealScanEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScanEventRepository for SurrealScanEventRepository<C> {
    async fn create(&self, input: CreateScanEvent) -> PawtagResult<ScanEvent> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let device_info = serde_json::to_value(&input.device_info)
            .map_err(|e| DbError::Decode(format!("device_info encode failed: {e}")))?;

        let result = self
            .db
            .query(
                "CREATE type::record('scan_event', $id) SET \
                 tag_id = $tag_id, \
                 pet_id = $pet_id, \
                 user_id = $user_id, \
                 device_info = $device_info, \
                 location = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tag_id", input.tag_id.to_string()))
            .bind(("pet_id", input.pet_id.map(|p| p.to_string())))
            .bind(("user_id", input.user_id.map(|u| u.to_string())))
            .bind(("device_info", device_info))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ScanEventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "scan_event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PawtagResult<ScanEvent> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('scan_event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScanEventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "scan_event".into(),
            id: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn patch_location(&self, id: Uuid, location: ScanLocation) -> PawtagResult<bool> {
        let location = serde_json::to_value(&location)
            .map_err(|e| DbError::Decode(format!("location encode failed: {e}")))?;

        // The null-location guard makes the patch at-most-once: a row
        // that was already enriched matches nothing and stays as-is.
        let result = self
            .db
            .query(
                "UPDATE type::record('scan_event', $id) SET \
                 location = $location \
                 WHERE location = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("location", location))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ScanEventRow> = result.take(0).map_err(DbError::from)?;
        Ok(!rows.is_empty())
    }

    async fn list_for_tag(
        &self,
        tag_id: Uuid,
        pagination: Pagination,
    ) -> PawtagResult<PaginatedResult<ScanEvent>> {
        let tag_id_str = tag_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM scan_event \
                 WHERE tag_id = $tag_id GROUP ALL",
            )
            .bind(("tag_id", tag_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM scan_event \
                 WHERE tag_id = $tag_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("tag_id", tag_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScanEventRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
