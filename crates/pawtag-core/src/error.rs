//! Error types for the PawTag system.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PawtagError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Tag {tag_id} is already claimed by another owner")]
    AlreadyClaimed { tag_id: Uuid },

    #[error("Tag {tag_id} is inactive and cannot be claimed")]
    TagInactive { tag_id: Uuid },

    #[error("Caller is not the owner of tag {tag_id}")]
    NotOwner { tag_id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Scan event persistence failed: {0}")]
    ScanPersistence(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PawtagResult<T> = Result<T, PawtagError>;
