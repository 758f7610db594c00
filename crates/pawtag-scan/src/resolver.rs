//! Tag resolution orchestration.
//!
//! Given a scanned code, loads the tag, decides what the handler
//! should surface (claim prompt / link prompt / pet profile) and, for
//! resolutions that reach a linked pet, schedules one scan record
//! without blocking the returned view.

use pawtag_core::error::{PawtagError, PawtagResult};
use pawtag_core::models::pet::Pet;
use pawtag_core::models::tag::Tag;
use pawtag_core::repository::{PetRepository, ScanEventRepository, TagRepository};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::device::ClientContext;
use crate::geo::GeoProvider;
use crate::recorder::{RecordScan, ScanRecorder};

/// What a scan handler should surface for a resolved code.
///
/// `UnownedUnlinked` and `OwnedUnlinked` are the cues to prompt the
/// authenticated caller for a claim or link action respectively; the
/// prompt itself is the handler's business.
#[derive(Debug, Clone)]
pub enum TagView {
    NotFound,
    /// Nobody owns this tag yet.
    UnownedUnlinked { tag: Tag },
    /// The caller owns the tag but has not linked a pet.
    OwnedUnlinked { tag: Tag },
    /// The caller is authenticated but somebody else owns the tag.
    OwnedByOther { tag: Tag },
    /// Tag resolves to a pet profile.
    Linked { tag: Tag, pet: Pet },
}

/// Orchestrates code resolution and scan recording.
pub struct TagResolver<T, Pe, S, P>
where
    S: ScanEventRepository + Clone + Send + Sync + 'static,
    P: GeoProvider + Clone + 'static,
{
    tags: T,
    pets: Pe,
    recorder: ScanRecorder<S, P>,
}

impl<T, Pe, S, P> TagResolver<T, Pe, S, P>
where
    T: TagRepository,
    Pe: PetRepository,
    S: ScanEventRepository + Clone + Send + Sync + 'static,
    P: GeoProvider + Clone + 'static,
{
    pub fn new(tags: T, pets: Pe, recorder: ScanRecorder<S, P>) -> Self {
        Self {
            tags,
            pets,
            recorder,
        }
    }

    /// Resolves a scanned code to a view.
    ///
    /// State-machine conditions come back as `TagView` variants, never
    /// as errors; only storage failures propagate.
    pub async fn resolve(
        &self,
        code: &str,
        requesting_user: Option<Uuid>,
        client: ClientContext,
    ) -> PawtagResult<TagView> {
        let tag = match self.tags.get_by_code(code).await {
            Ok(tag) => tag,
            Err(PawtagError::NotFound { .. }) => {
                debug!(code = %code, "scanned code matched no tag");
                return Ok(TagView::NotFound);
            }
            Err(e) => return Err(e),
        };

        if let Some(pet_id) = tag.pet_id {
            match self.pets.get_by_id(pet_id).await {
                Ok(pet) => {
                    self.schedule_scan(&tag, requesting_user, client);
                    return Ok(TagView::Linked { tag, pet });
                }
                Err(PawtagError::NotFound { .. }) => {
                    // Linked pet was deleted out from under the tag;
                    // degrade to the owner-based view.
                    warn!(tag_id = %tag.id, pet_id = %pet_id, "tag links to missing pet");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(match (tag.owner_id, requesting_user) {
            (None, _) => TagView::UnownedUnlinked { tag },
            (Some(owner), Some(user)) if owner == user => TagView::OwnedUnlinked { tag },
            (Some(_), _) => TagView::OwnedByOther { tag },
        })
    }

    /// Schedules one scan record without blocking the view. A failed
    /// record is logged; the profile still renders.
    fn schedule_scan(&self, tag: &Tag, user_id: Option<Uuid>, client: ClientContext) {
        let recorder = self.recorder.clone();
        let input = RecordScan {
            tag_id: tag.id,
            pet_id: tag.pet_id,
            user_id,
            client,
        };

        tokio::spawn(async move {
            if let Err(e) = recorder.record(input).await {
                warn!(error = %e, "scan record failed");
            }
        });
    }
}
