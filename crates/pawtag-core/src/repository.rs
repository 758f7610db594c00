//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The tag repository's `claim`
//! and `link` are conditional updates: the ownership check is part of
//! the same write as the mutation, never a separate read-then-write.

use uuid::Uuid;

use crate::error::PawtagResult;
use crate::models::{
    pet::{CreatePet, Pet},
    scan_event::{CreateScanEvent, ScanEvent, ScanLocation},
    tag::{CreateTag, Tag, UpdateTag},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait TagRepository: Send + Sync {
    fn create(&self, input: CreateTag) -> impl Future<Output = PawtagResult<Tag>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PawtagResult<Tag>> + Send;
    fn get_by_code(&self, code: &str) -> impl Future<Output = PawtagResult<Tag>> + Send;

    /// Compare-and-swap claim: sets `owner_id`, `status = Active` and
    /// `activated_at` in a single conditional write guarded by
    /// `owner_id = NONE AND status = Unassigned`.
    ///
    /// Returns `Ok(None)` when the guard did not hold (the caller
    /// classifies why); the tag is untouched in that case.
    fn claim(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> impl Future<Output = PawtagResult<Option<Tag>>> + Send;

    /// Conditional link: sets `pet_id` in a single write guarded by
    /// `owner_id = $owner_id`. Re-linking overwrites the previous pet.
    ///
    /// Returns `Ok(None)` when the caller does not own the tag (or the
    /// tag does not exist); the tag is untouched in that case.
    fn link(
        &self,
        id: Uuid,
        owner_id: Uuid,
        pet_id: Uuid,
    ) -> impl Future<Output = PawtagResult<Option<Tag>>> + Send;

    /// Clears owner, pet and activation, reverting to `Unassigned`.
    fn release(&self, id: Uuid) -> impl Future<Output = PawtagResult<Tag>> + Send;

    fn update(&self, id: Uuid, input: UpdateTag) -> impl Future<Output = PawtagResult<Tag>> + Send;

    /// Hard delete. Historical scan events keep their `tag_id`; the
    /// reference is invalidated logically, not cascaded physically.
    fn delete(&self, id: Uuid) -> impl Future<Output = PawtagResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PawtagResult<PaginatedResult<Tag>>> + Send;
}

pub trait PetRepository: Send + Sync {
    fn create(&self, input: CreatePet) -> impl Future<Output = PawtagResult<Pet>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PawtagResult<Pet>> + Send;
    fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PawtagResult<PaginatedResult<Pet>>> + Send;
}

pub trait ScanEventRepository: Send + Sync {
    /// Persists a new scan event with `location = None`.
    fn create(
        &self,
        input: CreateScanEvent,
    ) -> impl Future<Output = PawtagResult<ScanEvent>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PawtagResult<ScanEvent>> + Send;

    /// Sets `location` on an event whose location is still null.
    ///
    /// Conditional write (`WHERE location = NONE`): returns `Ok(true)`
    /// iff this call landed the patch. An already-enriched or missing
    /// row yields `Ok(false)` and is left untouched, which makes the
    /// at-most-once patch invariant hold even under duplicate
    /// enrichment tasks.
    fn patch_location(
        &self,
        id: Uuid,
        location: ScanLocation,
    ) -> impl Future<Output = PawtagResult<bool>> + Send;

    fn list_for_tag(
        &self,
        tag_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = PawtagResult<PaginatedResult<ScanEvent>>> + Send;
}
