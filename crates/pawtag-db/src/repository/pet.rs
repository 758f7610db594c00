//! SurrealDB implementation of [`PetRepository`].

use chrono::{DateTime, Utc};
use pawtag_core::error::PawtagResult;
use pawtag_core::models::pet::{CreatePet, Pet};
use pawtag_core::repository::{PaginatedResult, Pagination, PetRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PetRow {
    owner_id: String,
    name: String,
    species: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PetRowWithId {
    record_id: String,
    owner_id: String,
    name: String,
    species: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn row_to_pet(row: PetRow, id: Uuid) -> Result<Pet, DbError> {
    let owner_id = Uuid::parse_str(&row.owner_id)
        .map_err(|e| DbError::Decode(format!("invalid owner UUID: {e}")))?;
    Ok(Pet {
        id,
        owner_id,
        name: row.name,
        species: row.species,
        photo_url: row.photo_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl PetRowWithId {
    fn try_into_pet(self) -> Result<Pet, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Decode(format!("invalid owner UUID: {e}")))?;
        Ok(Pet {
            id,
            owner_id,
            name: self.name,
            species: self.species,
            photo_url: self.photo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Pet repository.
#[derive(Clone)]
pub struct SurrealPetRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPetRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PetRepository for SurrealPetRepository<C> {
    async fn create(&self, input: CreatePet) -> PawtagResult<Pet> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('pet', $id) SET \
                 owner_id = $owner_id, \
                 name = $name, \
                 species = $species, \
                 photo_url = $photo_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("name", input.name))
            .bind(("species", input.species))
            .bind(("photo_url", input.photo_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "pet".into(),
            id: id_str,
        })?;

        Ok(row_to_pet(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PawtagResult<Pet> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('pet', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "pet".into(),
            id: id_str,
        })?;

        Ok(row_to_pet(row, id)?)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> PawtagResult<PaginatedResult<Pet>> {
        let owner_id_str = owner_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM pet \
                 WHERE owner_id = $owner_id GROUP ALL",
            )
            .bind(("owner_id", owner_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM pet \
                 WHERE owner_id = $owner_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("owner_id", owner_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PetRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_pet())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
