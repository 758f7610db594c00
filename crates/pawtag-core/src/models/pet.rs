//! Pet domain model.
//!
//! Only the slice of the pet profile the tag resolver needs. Full
//! profile management lives outside this subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePet {
    pub owner_id: Uuid,
    pub name: String,
    pub species: Option<String>,
    pub photo_url: Option<String>,
}
