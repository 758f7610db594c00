//! SurrealDB implementation of [`TagRepository`].
//!
//! The claim and link operations are single-statement conditional
//! updates: the ownership guard travels in the `WHERE` clause of the
//! same `UPDATE` that performs the mutation, so two concurrent claims
//! of one tag can never both succeed. A read-then-write version of the
//! same logic would leave a window between the check and the write.

use chrono::{DateTime, Utc};
use pawtag_core::error::PawtagResult;
use pawtag_core::models::tag::{CreateTag, Tag, TagStatus, UpdateTag};
use pawtag_core::repository::{PaginatedResult, Pagination, TagRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TagRow {
    code: String,
    status: String,
    owner_id: Option<String>,
    pet_id: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    last_updated: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TagRowWithId {
    record_id: String,
    code: String,
    status: String,
    owner_id: Option<String>,
    pet_id: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    last_updated: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<TagStatus, DbError> {
    match s {
        "Unassigned" => Ok(TagStatus::Unassigned),
        "Active" => Ok(TagStatus::Active),
        "Inactive" => Ok(TagStatus::Inactive),
        other => Err(DbError::Decode(format!("unknown tag status: {other}"))),
    }
}

fn status_to_string(s: &TagStatus) -> &'static str {
    match s {
        TagStatus::Unassigned => "Unassigned",
        TagStatus::Active => "Active",
        TagStatus::Inactive => "Inactive",
    }
}

fn parse_opt_uuid(value: Option<String>, field: &str) -> Result<Option<Uuid>, DbError> {
    value
        .map(|s| {
            Uuid::parse_str(&s).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
        })
        .transpose()
}

impl TagRow {
    fn into_tag(self, id: Uuid) -> Result<Tag, DbError> {
        Ok(Tag {
            id,
            code: self.code,
            status: parse_status(&self.status)?,
            owner_id: parse_opt_uuid(self.owner_id, "owner")?,
            pet_id: parse_opt_uuid(self.pet_id, "pet")?,
            notes: self.notes,
            created_at: self.created_at,
            activated_at: self.activated_at,
            last_updated: self.last_updated,
        })
    }
}

impl TagRowWithId {
    fn try_into_tag(self) -> Result<Tag, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Tag {
            id,
            code: self.code,
            status: parse_status(&self.status)?,
            owner_id: parse_opt_uuid(self.owner_id, "owner")?,
            pet_id: parse_opt_uuid(self.pet_id, "pet")?,
            notes: self.notes,
            created_at: self.created_at,
            activated_at: self.activated_at,
            last_updated: self.last_updated,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Tag repository.
#[derive(Clone)]
pub struct SurrealTagRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTagRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TagRepository for SurrealTagRepository<C> {
    async fn create(&self, input: CreateTag) -> PawtagResult<Tag> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tag', $id) SET \
                 code = $code, \
                 status = 'Unassigned', \
                 owner_id = NONE, \
                 pet_id = NONE, \
                 notes = $notes, \
                 activated_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.into_tag(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PawtagResult<Tag> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tag', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.into_tag(id)?)
    }

    async fn get_by_code(&self, code: &str) -> PawtagResult<Tag> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 WHERE code = $code",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: format!("code={code}"),
        })?;

        Ok(row.try_into_tag()?)
    }

    async fn claim(&self, id: Uuid, owner_id: Uuid) -> PawtagResult<Option<Tag>> {
        let id_str = id.to_string();

        // The guard and the mutation are one atomic statement; an empty
        // result set means the guard did not hold and nothing was written.
        let result = self
            .db
            .query(
                "UPDATE type::record('tag', $id) SET \
                 owner_id = $owner_id, \
                 status = 'Active', \
                 activated_at = time::now(), \
                 last_updated = time::now() \
                 WHERE owner_id = NONE AND status = 'Unassigned'",
            )
            .bind(("id", id_str))
            .bind(("owner_id", owner_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_tag(id)?)),
            None => Ok(None),
        }
    }

    async fn link(&self, id: Uuid, owner_id: Uuid, pet_id: Uuid) -> PawtagResult<Option<Tag>> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('tag', $id) SET \
                 pet_id = $pet_id, \
                 last_updated = time::now() \
                 WHERE owner_id = $owner_id",
            )
            .bind(("id", id_str))
            .bind(("owner_id", owner_id.to_string()))
            .bind(("pet_id", pet_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_tag(id)?)),
            None => Ok(None),
        }
    }

    async fn release(&self, id: Uuid) -> PawtagResult<Tag> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('tag', $id) SET \
                 owner_id = NONE, \
                 pet_id = NONE, \
                 activated_at = NONE, \
                 status = 'Unassigned', \
                 last_updated = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.into_tag(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateTag) -> PawtagResult<Tag> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.notes.is_some() {
            sets.push("notes = $notes");
        }
        sets.push("last_updated = time::now()");

        let query = format!("UPDATE type::record('tag', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(ref status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(notes) = input.notes {
            builder = builder.bind(("notes", notes));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<TagRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tag".into(),
            id: id_str,
        })?;

        Ok(row.into_tag(id)?)
    }

    async fn delete(&self, id: Uuid) -> PawtagResult<()> {
        // Hard delete; scan history keeps its tag_id references.
        self.db
            .query("DELETE type::record('tag', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> PawtagResult<PaginatedResult<Tag>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tag GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tag \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TagRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tag())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
