//! SurrealDB repository implementations.

mod pet;
mod scan_event;
mod tag;

pub use pet::SurrealPetRepository;
pub use scan_event::SurrealScanEventRepository;
pub use tag::SurrealTagRepository;
