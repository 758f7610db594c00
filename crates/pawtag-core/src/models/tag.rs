//! Tag domain model.
//!
//! A tag is the physical NFC/QR object identified by a short `code`.
//! Ownership and pet linkage drive the lifecycle:
//! Unassigned (no owner) → claimed (owner set, status `Active`) →
//! linked (owner and pet set). `Inactive` is an administrative overlay
//! that does not clear owner or pet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TagStatus {
    Unassigned,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    /// Short human-typeable code printed on the physical tag.
    /// Globally unique, immutable once created.
    pub code: String,
    pub status: TagStatus,
    pub owner_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    /// Opaque admin notes (batch label, production run, ...).
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

impl Tag {
    /// Derived view over `status`; there is no independent active flag.
    pub fn is_active(&self) -> bool {
        self.status == TagStatus::Active
    }

    /// A tag can be linked to a pet only once it has an owner.
    pub fn is_claimed(&self) -> bool {
        self.owner_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub code: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTag {
    pub status: Option<TagStatus>,
    pub notes: Option<String>,
}
