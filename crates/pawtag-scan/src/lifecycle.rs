//! Tag lifecycle state machine.
//!
//! Unassigned → claimed (owner set, status `Active`) → linked (owner
//! and pet set), with `Inactive` as an administrative overlay that
//! does not clear owner or pet.
//!
//! Claim and link run as store-level conditional updates; this service
//! only classifies refusals after the fact. Reading the tag first and
//! writing second would let two concurrent claims both pass the check.

use pawtag_core::error::{PawtagError, PawtagResult};
use pawtag_core::models::tag::{CreateTag, Tag, TagStatus, UpdateTag};
use pawtag_core::repository::TagRepository;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::config::ScanConfig;
use crate::error::LifecycleError;

/// Code alphabet without lookalike characters (no i/l/o/0/1), since
/// codes get typed from a physical tag.
const CODE_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Tag lifecycle service.
///
/// Generic over the repository implementation so the state machine
/// has no dependency on the database crate.
pub struct TagLifecycle<T: TagRepository> {
    tags: T,
    config: ScanConfig,
}

impl<T: TagRepository> TagLifecycle<T> {
    pub fn new(tags: T, config: ScanConfig) -> Self {
        Self { tags, config }
    }

    /// Claims an unassigned tag for `user_id`.
    ///
    /// Exactly one of any number of concurrent claims succeeds; the
    /// rest fail with `AlreadyClaimed` and write nothing.
    pub async fn claim(&self, tag_id: Uuid, user_id: Uuid) -> PawtagResult<Tag> {
        // Two attempts: if the re-read after a refused swap shows a tag
        // that is claimable again (released between our swap and read),
        // retry the swap once instead of reporting a bogus conflict.
        for attempt in 0..2 {
            if let Some(tag) = self.tags.claim(tag_id, user_id).await? {
                info!(tag_id = %tag_id, owner_id = %user_id, "tag claimed");
                return Ok(tag);
            }

            // The swap was refused. Re-read purely to classify why; by
            // now the losing outcome is already settled.
            let tag = self.tags.get_by_id(tag_id).await?;
            if tag.owner_id.is_some() {
                return Err(LifecycleError::AlreadyClaimed(tag_id).into());
            }
            if tag.status == TagStatus::Inactive {
                return Err(LifecycleError::TagInactive(tag_id).into());
            }
            if attempt == 0 {
                info!(tag_id = %tag_id, "claimable tag refused the swap, retrying");
            }
        }
        Err(PawtagError::Internal(format!(
            "claim of tag {tag_id} kept being refused while unassigned"
        )))
    }

    /// Links a claimed tag to a pet. Only the owner may link;
    /// re-linking to a different pet overwrites the previous one.
    pub async fn link(&self, tag_id: Uuid, pet_id: Uuid, user_id: Uuid) -> PawtagResult<Tag> {
        if let Some(tag) = self.tags.link(tag_id, user_id, pet_id).await? {
            info!(tag_id = %tag_id, pet_id = %pet_id, "tag linked to pet");
            return Ok(tag);
        }

        // Distinguish a missing tag from an ownership refusal.
        self.tags.get_by_id(tag_id).await?;
        Err(LifecycleError::NotOwner(tag_id).into())
    }

    /// Admin: clears owner and pet, reverting the tag to `Unassigned`.
    pub async fn release(&self, tag_id: Uuid) -> PawtagResult<Tag> {
        let tag = self.tags.release(tag_id).await?;
        info!(tag_id = %tag_id, "tag released");
        Ok(tag)
    }

    /// Admin: deactivates a tag in place. Owner and pet are kept.
    pub async fn deactivate(&self, tag_id: Uuid) -> PawtagResult<Tag> {
        let tag = self
            .tags
            .update(
                tag_id,
                UpdateTag {
                    status: Some(TagStatus::Inactive),
                    ..Default::default()
                },
            )
            .await?;
        info!(tag_id = %tag_id, "tag deactivated");
        Ok(tag)
    }

    /// Admin: reverses a deactivation. The restored status derives
    /// from ownership: `Active` when an owner is present, `Unassigned`
    /// otherwise.
    pub async fn reactivate(&self, tag_id: Uuid) -> PawtagResult<Tag> {
        let current = self.tags.get_by_id(tag_id).await?;
        let restored = if current.owner_id.is_some() {
            TagStatus::Active
        } else {
            TagStatus::Unassigned
        };

        let tag = self
            .tags
            .update(
                tag_id,
                UpdateTag {
                    status: Some(restored),
                    ..Default::default()
                },
            )
            .await?;
        info!(tag_id = %tag_id, status = ?restored, "tag reactivated");
        Ok(tag)
    }

    /// Admin: mints a batch of unassigned tags with fresh random
    /// codes. The unique index on `code` backstops the (vanishingly
    /// unlikely) collision.
    pub async fn generate_batch(
        &self,
        count: usize,
        notes: Option<String>,
    ) -> PawtagResult<Vec<Tag>> {
        let mut tags = Vec::with_capacity(count);
        for _ in 0..count {
            let tag = self
                .tags
                .create(CreateTag {
                    code: generate_code(self.config.code_length),
                    notes: notes.clone(),
                })
                .await?;
            tags.push(tag);
        }
        info!(count = tags.len(), "tag batch generated");
        Ok(tags)
    }

    /// Admin: hard delete. Historical scan events keep their tag
    /// reference; it dangles logically from here on.
    pub async fn delete(&self, tag_id: Uuid) -> PawtagResult<()> {
        self.tags.delete(tag_id).await?;
        info!(tag_id = %tag_id, "tag deleted");
        Ok(())
    }
}
