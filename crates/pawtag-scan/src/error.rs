//! Lifecycle error types.

use pawtag_core::error::PawtagError;
use thiserror::Error;
use uuid::Uuid;

/// State-machine violations raised by tag lifecycle operations.
///
/// These abort cleanly with no partial mutation; the conditional
/// update in the store either wrote everything or nothing.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("tag {0} is already claimed by another owner")]
    AlreadyClaimed(Uuid),

    #[error("tag {0} is inactive")]
    TagInactive(Uuid),

    #[error("caller does not own tag {0}")]
    NotOwner(Uuid),
}

impl From<LifecycleError> for PawtagError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::AlreadyClaimed(tag_id) => PawtagError::AlreadyClaimed { tag_id },
            LifecycleError::TagInactive(tag_id) => PawtagError::TagInactive { tag_id },
            LifecycleError::NotOwner(tag_id) => PawtagError::NotOwner { tag_id },
        }
    }
}
